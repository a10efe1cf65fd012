//! Ordered fallback chain.
//!
//! Strategies are tried strictly in insertion order. The first success wins
//! and later strategies are never contacted; a failure is logged and the next
//! strategy is tried. Nothing is retried.

use std::fmt;

/// One way of turning an input into an output that may fail.
pub trait Strategy<I: ?Sized>: Send + Sync {
    type Output;
    type Error: fmt::Display;

    /// Name used in logs and in [`Resolved::strategy`].
    fn name(&self) -> &str;

    fn attempt(&self, input: &I) -> Result<Self::Output, Self::Error>;
}

pub type BoxedStrategy<I, O, E> = Box<dyn Strategy<I, Output = O, Error = E>>;

/// The chain produced a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<O> {
    pub strategy: String,
    pub value: O,
    /// Number of strategies contacted, including the successful one.
    pub attempts: usize,
}

/// Every strategy failed (or there were none).
#[derive(Debug)]
pub struct Exhausted<E> {
    pub failures: Vec<(String, E)>,
}

impl<E: fmt::Display> fmt::Display for Exhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return f.write_str("no strategies configured");
        }
        write!(f, "all {} strategies failed", self.failures.len())?;
        for (name, err) in &self.failures {
            write!(f, "; {name}: {err}")?;
        }
        Ok(())
    }
}

pub struct FallbackChain<I: ?Sized, O, E: fmt::Display> {
    strategies: Vec<BoxedStrategy<I, O, E>>,
}

impl<I: ?Sized, O, E: fmt::Display> Default for FallbackChain<I, O, E> {
    fn default() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }
}

impl<I: ?Sized, O, E: fmt::Display> fmt::Debug for FallbackChain<I, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackChain")
            .field("strategies", &self.names())
            .finish()
    }
}

impl<I: ?Sized, O, E: fmt::Display> FallbackChain<I, O, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy at the lowest priority.
    pub fn push<S>(&mut self, strategy: S)
    where
        S: Strategy<I, Output = O, Error = E> + 'static,
    {
        self.strategies.push(Box::new(strategy));
    }

    #[must_use]
    pub fn with<S>(mut self, strategy: S) -> Self
    where
        S: Strategy<I, Output = O, Error = E> + 'static,
    {
        self.push(strategy);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain against `input`.
    pub fn run(&self, input: &I) -> Result<Resolved<O>, Exhausted<E>> {
        let mut failures = Vec::new();
        for (idx, strategy) in self.strategies.iter().enumerate() {
            match strategy.attempt(input) {
                Ok(value) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        attempt = idx + 1,
                        "strategy succeeded"
                    );
                    return Ok(Resolved {
                        strategy: strategy.name().to_string(),
                        value,
                        attempts: idx + 1,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %err,
                        "strategy failed, trying next"
                    );
                    failures.push((strategy.name().to_string(), err));
                }
            }
        }
        Err(Exhausted { failures })
    }
}
