//! Display masking for identity numbers.

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    Citizenship,
    Pan,
    Passport,
    Account,
    Phone,
    Default,
}

impl MaskKind {
    fn visible(&self) -> usize {
        match self {
            MaskKind::Citizenship | MaskKind::Pan => 3,
            MaskKind::Passport => 2,
            MaskKind::Account | MaskKind::Phone => 4,
            MaskKind::Default => 2,
        }
    }
}

impl FromStr for MaskKind {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to [`MaskKind::Default`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "citizenship" => MaskKind::Citizenship,
            "pan" => MaskKind::Pan,
            "passport" => MaskKind::Passport,
            "account" => MaskKind::Account,
            "phone" => MaskKind::Phone,
            _ => MaskKind::Default,
        })
    }
}

pub fn mask_sensitive(value: &str, kind: MaskKind) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    let visible = kind.visible();
    let stars = |n: usize| "*".repeat(n);
    let slice = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    match kind {
        MaskKind::Citizenship | MaskKind::Pan | MaskKind::Passport => {
            // leading chars plus the last two; too short to hide anything otherwise
            if len <= visible + 2 {
                return value.to_string();
            }
            format!(
                "{}{}{}",
                slice(0, visible),
                stars(len - visible - 2),
                slice(len - 2, len)
            )
        }
        MaskKind::Account | MaskKind::Phone => {
            if len <= visible {
                return value.to_string();
            }
            format!("{}{}", stars(len - visible), slice(len - visible, len))
        }
        MaskKind::Default => {
            if len <= 4 {
                return value.to_string();
            }
            format!("{}{}{}", slice(0, 2), stars(len - 4), slice(len - 2, len))
        }
    }
}

/// An input still showing the mask means the user did not retype it.
pub fn unmask<'a>(masked: &'a str, original: &'a str) -> &'a str {
    if masked.contains('*') {
        original
    } else {
        masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_kinds() {
        assert_eq!(mask_sensitive("12345678", MaskKind::Citizenship), "123***78");
        assert_eq!(mask_sensitive("123456789", MaskKind::Pan), "123****89");
        assert_eq!(mask_sensitive("AB1234589", MaskKind::Passport), "AB*****89");
        assert_eq!(mask_sensitive("12345", MaskKind::Citizenship), "12345");
    }

    #[test]
    fn test_trailing_kinds() {
        assert_eq!(mask_sensitive("0123456789", MaskKind::Account), "******6789");
        assert_eq!(mask_sensitive("9812345678", MaskKind::Phone), "******5678");
        assert_eq!(mask_sensitive("5678", MaskKind::Phone), "5678");
    }

    #[test]
    fn test_default_and_empty() {
        assert_eq!(mask_sensitive("secret", MaskKind::Default), "se**et");
        assert_eq!(mask_sensitive("abcd", MaskKind::Default), "abcd");
        assert_eq!(mask_sensitive("", MaskKind::Pan), "");
        assert_eq!("licence".parse::<MaskKind>().unwrap(), MaskKind::Default);
    }

    #[test]
    fn test_unmask() {
        assert_eq!(unmask("123****89", "123456789"), "123456789");
        assert_eq!(unmask("987654321", "123456789"), "987654321");
    }
}
