//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::routing::origin::Origin;

/// Round-robin selector.
/// Stores an internal counter to rotate through a fixed backend list.
#[derive(Debug, Default)]
pub struct RoundRobin {
    origins: Vec<Origin>,
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new(origins: Vec<Origin>) -> Self {
        Self {
            origins,
            counter: AtomicUsize::new(0),
        }
    }

    /// Return the origin at the cursor and advance it.
    pub fn next_origin(&self) -> Option<Origin> {
        if self.origins.is_empty() {
            return None;
        }

        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.origins.len();
        Some(self.origins[index].clone())
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(s: &str) -> Origin {
        Origin::parse(s).unwrap()
    }

    #[test]
    fn test_round_robin() {
        let a = origin("http://10.0.0.1:8080");
        let b = origin("http://10.0.0.2:8080");
        let c = origin("http://10.0.0.3:8080");
        let lb = RoundRobin::new(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(lb.next_origin(), Some(a.clone()));
        assert_eq!(lb.next_origin(), Some(b));
        assert_eq!(lb.next_origin(), Some(c));
        assert_eq!(lb.next_origin(), Some(a));
    }

    #[test]
    fn test_empty_list() {
        let lb = RoundRobin::new(Vec::new());
        assert!(lb.next_origin().is_none());
    }

    #[test]
    fn test_concurrent_dispatch_is_roughly_fair() {
        use std::collections::HashMap;
        use std::sync::Arc;
        use std::thread;

        let lb = Arc::new(RoundRobin::new(vec![
            origin("http://10.0.0.1:1"),
            origin("http://10.0.0.2:2"),
        ]));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lb = lb.clone();
                thread::spawn(move || (0..100).map(|_| lb.next_origin().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            for o in handle.join().unwrap() {
                *counts.entry(o.to_string()).or_default() += 1;
            }
        }
        assert_eq!(counts.values().sum::<usize>(), 400);
        assert!(counts.values().all(|&n| n == 200));
    }
}
