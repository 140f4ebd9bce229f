//! X11 keysyms carried in `KeyEvent`.
//!
//! A keysym is a 32-bit symbolic key code from `keysymdef.h`. The set is
//! open: printable characters map to their Latin-1/Unicode values and any
//! other value passes through untouched, so the type is a wrapper over the
//! wire integer with names for the keys servers most often dispatch on.

use std::fmt;

/// An X11 keysym as carried in a `KeyEvent`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(
    /// The 32-bit keysym value.
    pub u32,
);

impl Key {
    /// Backspace.
    pub const BACK_SPACE: Self = Self(0xff08);
    /// Tab.
    pub const TAB: Self = Self(0xff09);
    /// Return (Enter).
    pub const RETURN: Self = Self(0xff0d);
    /// Escape.
    pub const ESCAPE: Self = Self(0xff1b);
    /// Insert.
    pub const INSERT: Self = Self(0xff63);
    /// Delete.
    pub const DELETE: Self = Self(0xffff);
    /// Home.
    pub const HOME: Self = Self(0xff50);
    /// Left cursor key.
    pub const LEFT: Self = Self(0xff51);
    /// Up cursor key.
    pub const UP: Self = Self(0xff52);
    /// Right cursor key.
    pub const RIGHT: Self = Self(0xff53);
    /// Down cursor key.
    pub const DOWN: Self = Self(0xff54);
    /// Page Up.
    pub const PAGE_UP: Self = Self(0xff55);
    /// Page Down.
    pub const PAGE_DOWN: Self = Self(0xff56);
    /// End.
    pub const END: Self = Self(0xff57);
    /// Function key F1.
    pub const F1: Self = Self(0xffbe);
    /// Function key F2.
    pub const F2: Self = Self(0xffbf);
    /// Function key F3.
    pub const F3: Self = Self(0xffc0);
    /// Function key F4.
    pub const F4: Self = Self(0xffc1);
    /// Function key F5.
    pub const F5: Self = Self(0xffc2);
    /// Function key F6.
    pub const F6: Self = Self(0xffc3);
    /// Function key F7.
    pub const F7: Self = Self(0xffc4);
    /// Function key F8.
    pub const F8: Self = Self(0xffc5);
    /// Function key F9.
    pub const F9: Self = Self(0xffc6);
    /// Function key F10.
    pub const F10: Self = Self(0xffc7);
    /// Function key F11.
    pub const F11: Self = Self(0xffc8);
    /// Function key F12.
    pub const F12: Self = Self(0xffc9);
    /// Left Shift.
    pub const SHIFT_L: Self = Self(0xffe1);
    /// Right Shift.
    pub const SHIFT_R: Self = Self(0xffe2);
    /// Left Control.
    pub const CONTROL_L: Self = Self(0xffe3);
    /// Right Control.
    pub const CONTROL_R: Self = Self(0xffe4);
    /// Left Meta.
    pub const META_L: Self = Self(0xffe7);
    /// Right Meta.
    pub const META_R: Self = Self(0xffe8);
    /// Left Alt.
    pub const ALT_L: Self = Self(0xffe9);
    /// Right Alt.
    pub const ALT_R: Self = Self(0xffea);
    /// Space bar.
    pub const SPACE: Self = Self(0x0020);

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::BACK_SPACE => "BackSpace",
            Self::TAB => "Tab",
            Self::RETURN => "Return",
            Self::ESCAPE => "Escape",
            Self::INSERT => "Insert",
            Self::DELETE => "Delete",
            Self::HOME => "Home",
            Self::LEFT => "Left",
            Self::UP => "Up",
            Self::RIGHT => "Right",
            Self::DOWN => "Down",
            Self::PAGE_UP => "PageUp",
            Self::PAGE_DOWN => "PageDown",
            Self::END => "End",
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
            Self::SHIFT_L => "Shift_L",
            Self::SHIFT_R => "Shift_R",
            Self::CONTROL_L => "Control_L",
            Self::CONTROL_R => "Control_R",
            Self::META_L => "Meta_L",
            Self::META_R => "Meta_R",
            Self::ALT_L => "Alt_L",
            Self::ALT_R => "Alt_R",
            Self::SPACE => "space",
            _ => return None,
        })
    }
}

impl From<u32> for Key {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Key> for u32 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Key({:#06x})", self.0),
        }
    }
}
