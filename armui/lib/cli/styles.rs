use clap::builder::styling::{AnsiColor, Effects, Style, Styles};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const HEADING: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);

const FLAG: Style = AnsiColor::BrightWhite.on_default().effects(Effects::BOLD);

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Help and error colours for `armui`: cyan headings, bright flags and dimmed value names.
pub fn styles() -> Styles {
    Styles::styled()
        .header(HEADING)
        .usage(HEADING)
        .literal(FLAG)
        .placeholder(AnsiColor::Cyan.on_default().effects(Effects::DIMMED))
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_headings_and_flags() {
        let styles = styles();
        assert_eq!(*styles.get_header(), HEADING);
        assert_eq!(*styles.get_usage(), HEADING);
        assert_eq!(*styles.get_literal(), FLAG);
    }
}
