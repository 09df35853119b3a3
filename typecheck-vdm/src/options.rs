use serde::Deserialize;
use serde::Serialize;

/// The language the program is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
  /// VDM-SL: modules and flat specifications.
  #[default]
  Sl,
  /// VDM++: classes.
  Pp,
  /// VDM-RT: classes, `system` and real-time extensions.
  Rt,
}

impl Dialect {
  pub fn has_classes(self) -> bool {
    !matches!(self, Dialect::Sl)
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Release {
  Classic,
  /// VDM-10 adds `eq`/`ord` clauses, measures on mutual recursion and pure
  /// operations.
  #[default]
  Vdm10,
}

/// Options controlling a checking run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
  pub dialect: Dialect,
  pub release: Release,
  /// Type binds and `is_` narrowing use the strict subtype relation, and
  /// values that are compatible with but not subtypes of their target are
  /// errors.
  pub strict: bool,
  pub warn_unused: bool,
  /// Errors past this many are dropped and reported by one warning.
  pub max_errors: usize,
}

impl Default for CheckOptions {
  fn default() -> Self {
    CheckOptions {
      dialect: Dialect::Sl,
      release: Release::Vdm10,
      strict: false,
      warn_unused: true,
      max_errors: 100,
    }
  }
}

impl CheckOptions {
  pub fn sl() -> Self {
    CheckOptions::default()
  }

  pub fn pp() -> Self {
    CheckOptions {
      dialect: Dialect::Pp,
      ..CheckOptions::default()
    }
  }

  pub fn rt() -> Self {
    CheckOptions {
      dialect: Dialect::Rt,
      ..CheckOptions::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_options_fill_in_defaults() {
    let options: CheckOptions = serde_json::from_str(r#"{"dialect":"pp","max_errors":5}"#).unwrap();
    assert_eq!(options.dialect, Dialect::Pp);
    assert_eq!(options.max_errors, 5);
    assert!(options.warn_unused);
    assert_eq!(options.release, Release::Vdm10);
  }

  #[test]
  fn unknown_dialect_is_rejected() {
    assert!(serde_json::from_str::<CheckOptions>(r#"{"dialect":"java"}"#).is_err());
  }
}
