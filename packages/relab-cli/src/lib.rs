use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

use relab_domain::Strategy;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// `after_help` block listing every strategy id, marking the ones compare mode rejects.
pub fn strategy_help() -> String {
	let mut help = String::from("Strategies:\n");

	for strategy in Strategy::ALL {
		help.push_str(&format!("  {:<18} {}", strategy.id(), strategy.label()));

		if !strategy.is_comparable() {
			help.push_str(" (single mode only)");
		}

		help.push('\n');
	}

	help
}
