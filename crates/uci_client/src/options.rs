//! UCI option schema parsing
//!
//! During the handshake an engine advertises its tunables one line at a
//! time: `option name <NAME> type <T> [default V] [min V] [max V]
//! [var V]…`. This module turns those lines into typed descriptors the
//! front-end can present and update.
//!
//! Malformed lines are never fatal: they degrade to
//! [`OptionValue::Unknown`] retaining the raw text, and the handshake
//! carries on. Option names may contain spaces, the name is everything
//! between `name ` and ` type `.

/// A single advertised engine option: its name plus typed state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UciOption {
    pub name: String,
    pub value: OptionValue,
}

/// The typed payload of an option descriptor.
///
/// `current` starts at the parsed default and is updated locally when
/// the driver sends `setoption`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    /// Integer option with an allowed range.
    Spin {
        default: i64,
        min: i64,
        max: i64,
        current: i64,
    },
    /// Boolean option.
    Check { default: bool, current: bool },
    /// One choice out of an ordered set of variants.
    Combo {
        choices: Vec<String>,
        default: String,
        current: String,
    },
    /// An action with no value, optionally labelled.
    Button { label: Option<String> },
    /// Free-form text option.
    Text { default: String, current: String },
    /// Anything the parser could not make sense of; raw line retained.
    Unknown { raw: String },
}

impl UciOption {
    /// Parse one `option …` line into a descriptor.
    ///
    /// Lines that do not fit the schema yield an `Unknown` descriptor
    /// (with whatever name fragment could be recovered) rather than an
    /// error.
    pub fn parse(line: &str) -> UciOption {
        match parse_inner(line) {
            Some(option) => option,
            None => UciOption {
                name: recover_name(line).unwrap_or_default(),
                value: OptionValue::Unknown {
                    raw: line.to_string(),
                },
            },
        }
    }

    /// Record a value sent with `setoption` into the local descriptor.
    ///
    /// Best-effort: values that do not fit the option's type leave the
    /// current value untouched.
    pub fn record_current(&mut self, value: &str) {
        match &mut self.value {
            OptionValue::Spin { current, min, max, .. } => {
                if let Ok(parsed) = value.parse::<i64>() {
                    if parsed >= *min && parsed <= *max {
                        *current = parsed;
                    }
                }
            }
            OptionValue::Check { current, .. } => {
                if let Ok(parsed) = value.parse::<bool>() {
                    *current = parsed;
                }
            }
            OptionValue::Combo { choices, current, .. } => {
                if choices.iter().any(|choice| choice == value) {
                    *current = value.to_string();
                }
            }
            OptionValue::Text { current, .. } => {
                *current = value.to_string();
            }
            OptionValue::Button { .. } | OptionValue::Unknown { .. } => {}
        }
    }
}

/// The name sits between `name ` and ` type `.
fn recover_name(line: &str) -> Option<String> {
    let after_name = line.find("name ")? + "name ".len();
    let rest = &line[after_name..];
    let name = match rest.find(" type ") {
        Some(type_pos) => &rest[..type_pos],
        None => rest,
    };
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn parse_inner(line: &str) -> Option<UciOption> {
    let after_name = line.find("name ")? + "name ".len();
    let rest = &line[after_name..];
    let type_pos = rest.find(" type ")?;
    let name = rest[..type_pos].trim().to_string();
    if name.is_empty() {
        return None;
    }

    let after_type = &rest[type_pos + " type ".len()..];
    let mut tokens = after_type.split_whitespace();
    let kind = tokens.next()?;
    let remainder: Vec<&str> = tokens.collect();

    let value = match kind {
        "spin" => {
            let default = keyword_int(&remainder, "default")?;
            let min = keyword_int(&remainder, "min")?;
            let max = keyword_int(&remainder, "max")?;
            OptionValue::Spin {
                default,
                min,
                max,
                current: default,
            }
        }
        "check" => {
            let default = match keyword_run(&remainder, "default").as_deref() {
                Some("true") => true,
                Some("false") => false,
                _ => return None,
            };
            OptionValue::Check {
                default,
                current: default,
            }
        }
        "combo" => {
            let choices = var_runs(&remainder);
            if choices.is_empty() {
                return None;
            }
            let default = keyword_run(&remainder, "default")
                .unwrap_or_else(|| choices[0].clone());
            OptionValue::Combo {
                current: default.clone(),
                default,
                choices,
            }
        }
        "button" => {
            let label = keyword_run(&remainder, "label");
            OptionValue::Button { label }
        }
        "string" => {
            // String defaults may legitimately be empty.
            let default = keyword_run(&remainder, "default").unwrap_or_default();
            OptionValue::Text {
                current: default.clone(),
                default,
            }
        }
        _ => return None,
    };

    Some(UciOption { name, value })
}

/// The keywords that delimit value runs inside an option line.
const KEYWORDS: [&str; 5] = ["default", "min", "max", "var", "label"];

/// Tokens following `keyword`, joined with spaces, up to the next
/// keyword or the end of the line.
fn keyword_run(tokens: &[&str], keyword: &str) -> Option<String> {
    let start = tokens.iter().position(|t| *t == keyword)? + 1;
    let run: Vec<&str> = tokens[start..]
        .iter()
        .take_while(|t| !KEYWORDS.contains(*t))
        .copied()
        .collect();
    Some(run.join(" "))
}

fn keyword_int(tokens: &[&str], keyword: &str) -> Option<i64> {
    keyword_run(tokens, keyword)?.parse().ok()
}

/// All `var` runs in order of appearance.
fn var_runs(tokens: &[&str]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "var" {
            let run: Vec<&str> = tokens[i + 1..]
                .iter()
                .take_while(|t| !KEYWORDS.contains(*t))
                .copied()
                .collect();
            runs.push(run.join(" "));
            i += 1 + run.len();
        } else {
            i += 1;
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_option_with_range() {
        //! Spin options carry default/min/max and start current at default
        let option = UciOption::parse("option name Hash type spin default 16 min 1 max 33554432");
        assert_eq!(option.name, "Hash");
        assert_eq!(
            option.value,
            OptionValue::Spin {
                default: 16,
                min: 1,
                max: 33554432,
                current: 16
            }
        );
    }

    #[test]
    fn test_check_option() {
        let option = UciOption::parse("option name Ponder type check default false");
        assert_eq!(option.name, "Ponder");
        assert_eq!(
            option.value,
            OptionValue::Check {
                default: false,
                current: false
            }
        );
    }

    #[test]
    fn test_combo_option_with_spaced_variants() {
        //! Combo variants may contain spaces; order is preserved
        let option = UciOption::parse(
            "option name Style type combo default Normal var Solid var Normal var Risky Play",
        );
        assert_eq!(option.name, "Style");
        assert_eq!(
            option.value,
            OptionValue::Combo {
                choices: vec![
                    "Solid".to_string(),
                    "Normal".to_string(),
                    "Risky Play".to_string()
                ],
                default: "Normal".to_string(),
                current: "Normal".to_string(),
            }
        );
    }

    #[test]
    fn test_combo_default_falls_back_to_first_variant() {
        let option = UciOption::parse("option name Mode type combo var Fast var Slow");
        match option.value {
            OptionValue::Combo { default, current, .. } => {
                assert_eq!(default, "Fast");
                assert_eq!(current, "Fast");
            }
            other => panic!("expected combo, got {other:?}"),
        }
    }

    #[test]
    fn test_button_and_string_options() {
        let button = UciOption::parse("option name Clear Hash type button");
        assert_eq!(button.name, "Clear Hash");
        assert_eq!(button.value, OptionValue::Button { label: None });

        let string = UciOption::parse("option name SyzygyPath type string default <empty>");
        assert_eq!(
            string.value,
            OptionValue::Text {
                default: "<empty>".to_string(),
                current: "<empty>".to_string()
            }
        );

        let empty_default = UciOption::parse("option name NalimovPath type string default");
        assert_eq!(
            empty_default.value,
            OptionValue::Text {
                default: String::new(),
                current: String::new()
            }
        );
    }

    #[test]
    fn test_name_with_spaces() {
        //! Everything between `name ` and ` type ` is the name
        let option =
            UciOption::parse("option name Skill Level Maximum Error type spin default 200 min 0 max 5000");
        assert_eq!(option.name, "Skill Level Maximum Error");
    }

    #[test]
    fn test_malformed_lines_degrade_to_unknown() {
        //! Bad lines keep their raw text and never panic
        let garbage = UciOption::parse("option gibberish");
        assert_eq!(
            garbage.value,
            OptionValue::Unknown {
                raw: "option gibberish".to_string()
            }
        );

        let bad_spin = UciOption::parse("option name Hash type spin default lots");
        assert_eq!(bad_spin.name, "Hash");
        assert!(matches!(bad_spin.value, OptionValue::Unknown { .. }));

        let bad_type = UciOption::parse("option name X type widget default 3");
        assert!(matches!(bad_type.value, OptionValue::Unknown { .. }));
    }

    #[test]
    fn test_record_current_respects_types() {
        //! record_current updates in-range values and ignores misfits
        let mut spin = UciOption::parse("option name Hash type spin default 16 min 1 max 128");
        spin.record_current("64");
        assert!(matches!(spin.value, OptionValue::Spin { current: 64, .. }));
        spin.record_current("9999"); // out of range, ignored
        assert!(matches!(spin.value, OptionValue::Spin { current: 64, .. }));

        let mut check = UciOption::parse("option name Ponder type check default false");
        check.record_current("true");
        assert!(matches!(check.value, OptionValue::Check { current: true, .. }));

        let mut combo = UciOption::parse("option name Mode type combo default A var A var B");
        combo.record_current("B");
        assert!(
            matches!(combo.value, OptionValue::Combo { ref current, .. } if current == "B")
        );
        combo.record_current("C"); // not a variant, ignored
        assert!(
            matches!(combo.value, OptionValue::Combo { ref current, .. } if current == "B")
        );
    }
}
