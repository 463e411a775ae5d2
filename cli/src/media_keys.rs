use std::io::{self, Write};

use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

/// Ask the terminal to report media keys as distinct key events
///
/// Terminals only send them once escape codes are disambiguated, and only
/// terminals supporting the keyboard enhancement protocol can do that.
/// Returns whether the flags were pushed, which must be handed back to
/// [`disable`] before the terminal is restored.
pub fn enable<W: Write>(out: &mut W, supported: bool) -> io::Result<bool> {
    if !supported {
        log::info!("Keyboard enhancement unsupported; media keys unavailable");
        return Ok(false);
    }

    execute!(
        out,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    )?;
    log::debug!("Enabled media key reporting");
    Ok(true)
}

pub fn disable<W: Write>(out: &mut W, enabled: bool) -> io::Result<()> {
    if enabled {
        execute!(out, PopKeyboardEnhancementFlags)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pushes_and_pops_flags_when_supported() {
        let mut out = Vec::new();
        let enabled = enable(&mut out, true).unwrap();
        assert!(enabled);
        assert_eq!(out, b"\x1B[>1u");

        out.clear();
        disable(&mut out, enabled).unwrap();
        assert_eq!(out, b"\x1B[<1u");
    }

    #[test]
    fn test_unsupported_terminal_is_left_alone() {
        let mut out = Vec::new();
        let enabled = enable(&mut out, false).unwrap();
        assert!(!enabled);

        disable(&mut out, enabled).unwrap();
        assert!(out.is_empty());
    }
}
