use diagnostics::Diagnostic;
use diagnostics::FileId;
use diagnostics::Label;
use diagnostics::Span;
use diagnostics::TextRange;
use serde_json::json;

#[test]
fn diagnostics_serialize_with_stable_field_names() {
  let diag = Diagnostic::error(
    3064,
    "Overriding member incompatible type",
    Span::new(FileId(1), TextRange::new(4, 9)),
  )
  .with_label(Label::secondary(
    Span::new(FileId(0), TextRange::new(2, 3)),
    "overridden here",
  ))
  .with_detail("Expected", "nat -> nat");

  let value = serde_json::to_value(&diag).unwrap();
  assert_eq!(value["code"], json!(3064));
  assert_eq!(value["severity"], json!("Error"));
  assert_eq!(value["primary"]["file"], json!(1));
  assert_eq!(value["primary"]["range"], json!({ "start": 4, "end": 9 }));
  assert_eq!(value["labels"][0]["is_primary"], json!(false));
  assert_eq!(
    value["details"],
    json!([{ "tag": "Expected", "value": "nat -> nat" }])
  );

  let back: Diagnostic = serde_json::from_value(value).unwrap();
  assert_eq!(back, diag);
}
