//! String interning for identifiers and keywords.
//!
//! A [`Symbol`] is a compact, `Copy` handle to a string held in a global
//! table. Comparing two symbols is an integer comparison rather than a
//! string comparison, and the lexer interns every identifier and keyword
//! it sees, so this pays for itself even in a single-pass compiler this
//! small.

use std::fmt;
use std::sync::{Mutex, OnceLock};

/// An interned string.
///
/// # Examples
///
/// ```
/// use toyc_util::Symbol;
///
/// let a = Symbol::intern("main");
/// let b = Symbol::intern("main");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "main");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

struct Interner {
    strings: Vec<&'static str>,
}

impl Interner {
    fn new() -> Self {
        Self {
            strings: Vec::new(),
        }
    }

    fn intern(&mut self, s: &str) -> Symbol {
        if let Some(idx) = self.strings.iter().position(|&existing| existing == s) {
            return Symbol(idx as u32);
        }
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        let idx = self.strings.len();
        self.strings.push(leaked);
        Symbol(idx as u32)
    }

    fn get(&self, sym: Symbol) -> &'static str {
        self.strings[sym.0 as usize]
    }
}

fn table() -> &'static Mutex<Interner> {
    static TABLE: OnceLock<Mutex<Interner>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(Interner::new()))
}

impl Symbol {
    /// Interns `s`, returning the same [`Symbol`] for equal strings.
    pub fn intern(s: &str) -> Self {
        table().lock().unwrap().intern(s)
    }

    /// The interned string. O(1): the table stores `'static` slices.
    pub fn as_str(&self) -> &'static str {
        table().lock().unwrap().get(*self)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_yields_same_symbol() {
        assert_eq!(Symbol::intern("foo"), Symbol::intern("foo"));
    }

    #[test]
    fn interning_different_strings_yields_different_symbols() {
        assert_ne!(Symbol::intern("foo_sym_test"), Symbol::intern("bar_sym_test"));
    }

    #[test]
    fn round_trips_through_as_str() {
        let sym = Symbol::intern("round_trip_test");
        assert_eq!(sym.as_str(), "round_trip_test");
    }
}
