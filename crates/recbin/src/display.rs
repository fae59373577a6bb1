//! Human-readable rendering of decoded items.

use std::fmt;

use crate::Item;

/// Integers in hex, strings as escaped quoted literals, lists bracketed
/// recursively. A malformed element renders as `<malformed>` instead of
/// aborting the formatter.
impl fmt::Display for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("null");
        }
        if self.size().is_err() {
            return f.write_str("<malformed>");
        }
        if self.is_int() {
            let mag = self.int_be_bytes();
            if mag.is_empty() {
                return f.write_str("0x0");
            }
            f.write_str("0x")?;
            for b in mag {
                write!(f, "{b:02x}")?;
            }
            Ok(())
        } else if self.is_string() {
            f.write_str("\"")?;
            for &b in self.as_bytes() {
                if (b' '..0x7f).contains(&b) && b != b'"' && b != b'\\' {
                    write!(f, "{}", b as char)?;
                } else {
                    write!(f, "\\x{b:02x}")?;
                }
            }
            f.write_str("\"")
        } else {
            f.write_str("[")?;
            for (i, child) in self.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                match child {
                    Ok(child) => write!(f, " {child}")?,
                    Err(_) => return f.write_str(" <malformed> ]"),
                }
            }
            f.write_str(" ]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn renders_nested_values() {
        let buf = hex!("8a884363617443646f670f");
        assert_eq!(
            Item::new(&buf).to_string(),
            r#"[ [ "cat", "dog" ], 0x0f ]"#
        );
    }

    #[test]
    fn renders_escapes_and_defaults() {
        let buf = hex!("4200e4");
        assert_eq!(Item::new(&buf).to_string(), r#""\x00\xe4""#);
        assert_eq!(Item::null().to_string(), "null");

        let buf = hex!("c0");
        assert_eq!(Item::new(&buf).to_string(), "<malformed>");
    }
}
