//! Mode ownership token.
//!
//! Exactly one interactive mode owns the display and the right to write the
//! RTC at any time. Ownership moves only through [`Tokens::transfer`], which
//! checks the caller really is the holder.

use bitfield::bitfield;

/// Interactive modes that can hold the ownership token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Clock,
    Menu,
    Alarm,
    Temp,
    Hour,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Clock, Mode::Menu, Mode::Alarm, Mode::Temp, Mode::Hour];

    fn mask(self) -> u8 {
        match self {
            Mode::Clock => 1 << 0,
            Mode::Menu => 1 << 1,
            Mode::Alarm => 1 << 2,
            Mode::Temp => 1 << 3,
            Mode::Hour => 1 << 4,
        }
    }
}

bitfield! {
    /// One flag per mode.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct TokenFlags(u8);
    impl Debug;
    pub clock, set_clock: 0;
    pub menu, set_menu: 1;
    pub alarm, set_alarm: 2;
    pub temp, set_temp: 3;
    pub hour, set_hour: 4;
}

impl From<TokenFlags> for u8 {
    fn from(v: TokenFlags) -> Self {
        v.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TokenFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TokenFlags({=u8:b})", self.0);
    }
}

/// Ownership contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenError {
    /// `from` tried to hand off a token it does not hold
    NotHolder { from: Mode, holder: Mode },
    /// The flag set no longer has exactly one bit set
    NotExclusive(TokenFlags),
}

/// The ownership token set. Exactly one mode holds the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tokens {
    flags: TokenFlags,
}

impl Tokens {
    /// Token set with `holder` owning the token.
    pub fn new(holder: Mode) -> Self {
        Self {
            flags: TokenFlags(holder.mask()),
        }
    }

    /// Current holder.
    pub fn holder(&self) -> Mode {
        Mode::ALL
            .into_iter()
            .find(|mode| self.holds(*mode))
            .unwrap_or(Mode::Clock)
    }

    pub fn holds(&self, mode: Mode) -> bool {
        self.flags.0 & mode.mask() != 0
    }

    pub fn flags(&self) -> TokenFlags {
        self.flags
    }

    /// `true` when exactly one flag is set.
    pub fn is_exclusive(&self) -> bool {
        self.flags.0.count_ones() == 1
    }

    /// Hands the token from `from` to `to`.
    ///
    /// # Errors
    /// `TokenError::NotHolder` if `from` does not currently hold the token;
    /// the set is left untouched.
    pub fn transfer(&mut self, from: Mode, to: Mode) -> Result<(), TokenError> {
        if !self.is_exclusive() {
            return Err(TokenError::NotExclusive(self.flags));
        }
        if !self.holds(from) {
            return Err(TokenError::NotHolder {
                from,
                holder: self.holder(),
            });
        }
        self.flags = TokenFlags(to.mask());
        info!("token {:?} -> {:?}", from, to);
        Ok(())
    }

    /// Gives the token back to Clock regardless of the current state.
    pub fn force_reset(&mut self) {
        *self = Tokens::new(Mode::Clock);
    }
}

impl Default for Tokens {
    fn default() -> Self {
        Tokens::new(Mode::Clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_single_holder() {
        for mode in Mode::ALL {
            let tokens = Tokens::new(mode);
            assert!(tokens.is_exclusive());
            assert_eq!(tokens.holder(), mode);
        }
        assert_eq!(Tokens::default().holder(), Mode::Clock);
    }

    #[test]
    fn test_flag_layout() {
        let tokens = Tokens::new(Mode::Temp);
        assert!(tokens.flags().temp());
        assert!(!tokens.flags().clock());
        assert_eq!(u8::from(tokens.flags()), 0b01000);
    }

    #[test]
    fn test_transfer_moves_token() {
        let mut tokens = Tokens::new(Mode::Clock);
        tokens.transfer(Mode::Clock, Mode::Menu).unwrap();
        assert!(tokens.holds(Mode::Menu));
        assert!(!tokens.holds(Mode::Clock));
        assert!(tokens.is_exclusive());

        tokens.transfer(Mode::Menu, Mode::Hour).unwrap();
        tokens.transfer(Mode::Hour, Mode::Clock).unwrap();
        assert_eq!(tokens.holder(), Mode::Clock);
    }

    #[test]
    fn test_transfer_from_non_holder_fails() {
        let mut tokens = Tokens::new(Mode::Menu);
        let err = tokens.transfer(Mode::Clock, Mode::Alarm).unwrap_err();
        assert_eq!(
            err,
            TokenError::NotHolder {
                from: Mode::Clock,
                holder: Mode::Menu
            }
        );
        assert_eq!(tokens.holder(), Mode::Menu);
        assert!(tokens.is_exclusive());
    }

    #[test]
    fn test_transfer_to_self() {
        let mut tokens = Tokens::new(Mode::Alarm);
        tokens.transfer(Mode::Alarm, Mode::Alarm).unwrap();
        assert_eq!(tokens.holder(), Mode::Alarm);
        assert!(tokens.is_exclusive());
    }

    #[test]
    fn test_force_reset() {
        let mut tokens = Tokens::new(Mode::Hour);
        tokens.force_reset();
        assert_eq!(tokens, Tokens::new(Mode::Clock));
    }
}
