use relab_domain::{DEFAULT_COMPARE, Strategy};

use crate::{Error, Result};

/// Ordered set of strategies for compare mode. Holds comparable strategies only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareSelection {
	strategies: Vec<Strategy>,
}
impl CompareSelection {
	pub fn empty() -> Self {
		Self { strategies: Vec::new() }
	}

	/// Builds a selection in the given order, ignoring repeats.
	pub fn from_strategies<I>(strategies: I) -> Result<Self>
	where
		I: IntoIterator<Item = Strategy>,
	{
		let mut selection = Self::empty();

		for strategy in strategies {
			selection.select(strategy)?;
		}

		Ok(selection)
	}

	pub fn strategies(&self) -> &[Strategy] {
		&self.strategies
	}

	pub fn contains(&self, strategy: Strategy) -> bool {
		self.strategies.contains(&strategy)
	}

	pub fn is_empty(&self) -> bool {
		self.strategies.is_empty()
	}

	pub fn select(&mut self, strategy: Strategy) -> Result<()> {
		ensure_comparable(strategy)?;

		if !self.contains(strategy) {
			self.strategies.push(strategy);
		}

		Ok(())
	}

	pub fn deselect(&mut self, strategy: Strategy) {
		self.strategies.retain(|selected| *selected != strategy);
	}

	/// Flips membership and returns whether `strategy` is selected afterwards.
	pub fn toggle(&mut self, strategy: Strategy) -> Result<bool> {
		if self.contains(strategy) {
			self.deselect(strategy);

			return Ok(false);
		}

		self.select(strategy)?;

		Ok(true)
	}
}
impl Default for CompareSelection {
	fn default() -> Self {
		Self { strategies: DEFAULT_COMPARE.to_vec() }
	}
}

fn ensure_comparable(strategy: Strategy) -> Result<()> {
	if strategy.is_comparable() {
		return Ok(());
	}

	Err(Error::InvalidRequest {
		message: format!("{strategy} is only available in single mode."),
	})
}
