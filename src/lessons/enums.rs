//! Enumerations with explicit discriminants, and constants derived from a
//! running index.

use std::fmt;

/// Days of the week numbered from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// The day numbered `index`, or `None` outside `0..=6`.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Every day, Sunday first.
    pub fn iter() -> impl Iterator<Item = Weekday> {
        Self::ALL.into_iter()
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Weekday {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(index)
    }
}

/// The pair of constants declared on line `i` of a paired declaration.
pub const fn iota_pair(i: u32) -> (u32, u32) {
    (i, i << 10)
}

pub const A: u32 = iota_pair(0).0;
pub const B: u32 = iota_pair(0).1;
pub const C: u32 = iota_pair(1).0;
pub const D: u32 = iota_pair(1).1;

/// The enum lesson, one line per observation.
pub fn enum_demo() -> Vec<String> {
    let numbered: Vec<String> = Weekday::iter()
        .map(|day| format!("{day}={}", day.index()))
        .collect();
    vec![
        numbered.join(" "),
        format!("from_index(7) = {:?}", Weekday::from_index(7)),
        format!("A={A} B={B} C={C} D={D}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminants_are_sequential() {
        for (i, day) in Weekday::iter().enumerate() {
            assert_eq!(usize::from(day.index()), i);
            assert_eq!(Weekday::from_index(day.index()), Some(day));
        }
        assert_eq!(Weekday::Saturday as u8, 6);
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(Weekday::from_index(7), None);
        assert_eq!(Weekday::try_from(200), Err(200));
        assert_eq!(Weekday::try_from(1), Ok(Weekday::Monday));
    }

    #[test]
    fn test_display() {
        assert_eq!(Weekday::Wednesday.to_string(), "Wednesday");
    }

    #[test]
    fn test_paired_constants() {
        assert_eq!((A, B, C, D), (0, 0, 1, 1024));
    }

    #[test]
    fn test_demo() {
        let lines = enum_demo();
        assert!(lines[0].starts_with("Sunday=0 Monday=1"));
        assert_eq!(lines[2], "A=0 B=0 C=1 D=1024");
    }
}
