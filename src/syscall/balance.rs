//! Bracket Matcher
//!
//! Decides whether the `()` and `[]` pairs in a byte string are matched and
//! properly nested. Every other byte is ignored.
//!
//! The scan is a single left-to-right pass over a fixed-capacity stack and
//! stops at the first structural violation. Both stack edges are checked:
//! a closing bracket with nothing open is a mismatch, and nesting past the
//! stack capacity fails closed as [`Verdict::TooDeep`].

use core::fmt;

/// Capacity of the matcher's stack.
pub const MAX_DEPTH: usize = 100;

/// The two supported bracket kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Paren,
    Square,
}

impl Bracket {
    pub const fn open(self) -> u8 {
        match self {
            Bracket::Paren => b'(',
            Bracket::Square => b'[',
        }
    }

    pub const fn close(self) -> u8 {
        match self {
            Bracket::Paren => b')',
            Bracket::Square => b']',
        }
    }
}

/// A byte, as the matcher sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Open(Bracket),
    Close(Bracket),
    Other,
}

impl Token {
    #[inline]
    pub const fn classify(byte: u8) -> Self {
        match byte {
            b'(' => Token::Open(Bracket::Paren),
            b'[' => Token::Open(Bracket::Square),
            b')' => Token::Close(Bracket::Paren),
            b']' => Token::Close(Bracket::Square),
            _ => Token::Other,
        }
    }
}

/// Outcome of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Balanced,
    Unbalanced,
    /// Nesting exceeded the stack capacity.
    TooDeep,
}

/// The first structural problem found by [`scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Closing bracket does not pair with the innermost open one.
    Mismatch {
        offset: usize,
        open: Bracket,
        close: Bracket,
    },
    /// Closing bracket with nothing open.
    Underflow { offset: usize, close: Bracket },
    /// Input ended with brackets still open.
    Unclosed { depth: usize },
    /// Opening bracket would exceed the stack capacity.
    TooDeep { offset: usize, capacity: usize },
}

impl Violation {
    pub const fn verdict(self) -> Verdict {
        match self {
            Violation::TooDeep { .. } => Verdict::TooDeep,
            _ => Verdict::Unbalanced,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Violation::Mismatch { offset, open, close } => write!(
                f,
                "'{}' at offset {} closes '{}'",
                close.close() as char,
                offset,
                open.open() as char
            ),
            Violation::Underflow { offset, close } => write!(
                f,
                "'{}' at offset {} has nothing to close",
                close.close() as char,
                offset
            ),
            Violation::Unclosed { depth } => write!(f, "{} bracket(s) left open", depth),
            Violation::TooDeep { offset, capacity } => {
                write!(f, "nesting deeper than {} at offset {}", capacity, offset)
            }
        }
    }
}

/// Stack is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackFull;

/// Fixed-capacity LIFO of open brackets.
#[derive(Debug, Clone)]
pub struct MatchStack<const N: usize = MAX_DEPTH> {
    slots: [Bracket; N],
    depth: usize,
}

impl<const N: usize> MatchStack<N> {
    pub const fn new() -> Self {
        Self {
            slots: [Bracket::Paren; N],
            depth: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, bracket: Bracket) -> Result<(), StackFull> {
        let slot = self.slots.get_mut(self.depth).ok_or(StackFull)?;
        *slot = bracket;
        self.depth += 1;
        Ok(())
    }

    /// Pop the innermost bracket, or `None` when empty.
    #[inline]
    pub fn pop(&mut self) -> Option<Bracket> {
        self.depth = self.depth.checked_sub(1)?;
        Some(self.slots[self.depth])
    }

    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.depth == 0
    }
}

impl<const N: usize> Default for MatchStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan `input` with a stack of capacity `N`.
pub fn scan<const N: usize>(input: &[u8]) -> Result<(), Violation> {
    let mut stack = MatchStack::<N>::new();

    for (offset, &byte) in input.iter().enumerate() {
        match Token::classify(byte) {
            Token::Open(bracket) => {
                stack.push(bracket).map_err(|StackFull| Violation::TooDeep {
                    offset,
                    capacity: N,
                })?;
            }
            Token::Close(close) => {
                let open = stack.pop().ok_or(Violation::Underflow { offset, close })?;
                if open != close {
                    return Err(Violation::Mismatch {
                        offset,
                        open,
                        close,
                    });
                }
            }
            Token::Other => {}
        }
    }

    if !stack.is_empty() {
        return Err(Violation::Unclosed {
            depth: stack.depth(),
        });
    }
    Ok(())
}

/// Check `input` with the default stack capacity.
pub fn check(input: &[u8]) -> Verdict {
    match scan::<MAX_DEPTH>(input) {
        Ok(()) => Verdict::Balanced,
        Err(violation) => {
            log::debug!("unbalanced input: {}", violation);
            violation.verdict()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference recognizer: S -> "" | "(" S ")" S | "[" S "]" S
    fn dyck(s: &[u8]) -> bool {
        fn parse(s: &[u8], mut i: usize) -> Option<usize> {
            while i < s.len() {
                let close = match s[i] {
                    b'(' => b')',
                    b'[' => b']',
                    _ => return Some(i),
                };
                i = parse(s, i + 1)?;
                if s.get(i) != Some(&close) {
                    return None;
                }
                i += 1;
            }
            Some(i)
        }
        parse(s, 0) == Some(s.len())
    }

    #[test]
    fn test_scenarios() {
        assert_eq!(check(b"()[]"), Verdict::Balanced);
        assert_eq!(check(b"([)]"), Verdict::Unbalanced);
        assert_eq!(check(b"((("), Verdict::Unbalanced);
        assert_eq!(check(b")"), Verdict::Unbalanced);
        assert_eq!(check(b"hello world"), Verdict::Balanced);
        assert_eq!(check(b""), Verdict::Balanced);
    }

    #[test]
    fn test_violation_kinds() {
        assert_eq!(
            scan::<MAX_DEPTH>(b"([)]"),
            Err(Violation::Mismatch {
                offset: 2,
                open: Bracket::Square,
                close: Bracket::Paren,
            })
        );
        assert_eq!(
            scan::<MAX_DEPTH>(b"a]"),
            Err(Violation::Underflow {
                offset: 1,
                close: Bracket::Square,
            })
        );
        assert_eq!(
            scan::<MAX_DEPTH>(b"((("),
            Err(Violation::Unclosed { depth: 3 })
        );
    }

    #[test]
    fn test_stops_at_first_violation() {
        // A later underflow never masks the earlier mismatch.
        assert!(matches!(
            scan::<MAX_DEPTH>(b"(]))))"),
            Err(Violation::Mismatch { offset: 1, .. })
        ));
        // Bytes after the violation are never looked at.
        assert!(matches!(
            scan::<2>(b"]((((((("),
            Err(Violation::Underflow { offset: 0, .. })
        ));
    }

    #[test]
    fn test_filler_is_transparent() {
        assert_eq!(check(b"f(o[o]b)a{r}<>"), Verdict::Balanced);
        assert_eq!(check(b"\x01(\xff)\x7f"), Verdict::Balanced);
        assert_eq!(check(b"{(})"), Verdict::Balanced);
    }

    #[test]
    fn test_depth_limit() {
        let at_limit = [b"(".repeat(MAX_DEPTH), b")".repeat(MAX_DEPTH)].concat();
        assert_eq!(check(&at_limit), Verdict::Balanced);

        let past_limit = [b"[".repeat(MAX_DEPTH + 1), b"]".repeat(MAX_DEPTH + 1)].concat();
        assert_eq!(check(&past_limit), Verdict::TooDeep);
        assert_eq!(
            scan::<MAX_DEPTH>(&past_limit),
            Err(Violation::TooDeep {
                offset: MAX_DEPTH,
                capacity: MAX_DEPTH,
            })
        );
    }

    #[test]
    fn test_wide_but_shallow_input() {
        let input = b"()".repeat(127);
        assert_eq!(check(&input), Verdict::Balanced);
    }

    #[test]
    fn test_matches_reference_grammar() {
        const ALPHABET: [u8; 4] = *b"()[]";
        for len in 0..=8u32 {
            for mut n in 0..4usize.pow(len) {
                let mut s = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    s.push(ALPHABET[n % 4]);
                    n /= 4;
                }
                let expected = if dyck(&s) {
                    Verdict::Balanced
                } else {
                    Verdict::Unbalanced
                };
                assert_eq!(check(&s), expected, "input {:?}", core::str::from_utf8(&s));
            }
        }
    }

    #[test]
    fn test_stack_edges() {
        let mut stack = MatchStack::<2>::new();
        assert_eq!(stack.pop(), None);
        stack.push(Bracket::Paren).unwrap();
        stack.push(Bracket::Square).unwrap();
        assert_eq!(stack.push(Bracket::Paren), Err(StackFull));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), Some(Bracket::Square));
        assert_eq!(stack.pop(), Some(Bracket::Paren));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_violation_display() {
        let v = scan::<MAX_DEPTH>(b"(]").unwrap_err();
        assert_eq!(v.to_string(), "']' at offset 1 closes '('");
    }
}
