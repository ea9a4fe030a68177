use super::*;

/// Minimal cons list standing in for a long reference chain.
enum Chain {
    Link(Box<Chain>),
    End,
}

fn build_chain(len: usize) -> Chain {
    let mut chain = Chain::End;
    for _ in 0..len {
        chain = Chain::Link(Box::new(chain));
    }
    chain
}

fn chain_len(chain: &Chain) -> usize {
    ensure_sufficient_stack(|| match chain {
        Chain::Link(next) => chain_len(next) + 1,
        Chain::End => 0,
    })
}

#[test]
fn test_short_chain() {
    assert_eq!(chain_len(&build_chain(16)), 16);
}

#[test]
fn test_long_chain_does_not_overflow() {
    let chain = build_chain(200_000);
    assert_eq!(chain_len(&chain), 200_000);
    // Dropping a Box chain this long recursively would overflow too.
    let mut cursor = chain;
    while let Chain::Link(next) = cursor {
        cursor = *next;
    }
}

#[test]
fn test_propagates_result() {
    let result: Result<u32, String> = ensure_sufficient_stack(|| Err("boom".to_string()));
    assert_eq!(result, Err("boom".to_string()));
}
