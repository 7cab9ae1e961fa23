//! Tests for the definition-file line grammar.

use super::*;
use crate::dfn::catalogue::DEFAULT_RECORD_TYPE;
use crate::dfn::diagnostics::WarningKind;
use crate::format::FieldKind;

#[test]
fn test_parse_survey_definition() {
    let (catalogue, diagnostics) = parse_default(survey_dfn());

    assert!(diagnostics.is_clean());
    assert_eq!(catalogue.tags(), vec!["", "COMM"]);

    let record = catalogue.default_record_type().unwrap();
    assert_eq!(record.field_names(), vec!["LINE", "EASTING", "CON"]);
}

#[test]
fn test_field_attributes() {
    let (catalogue, _) = parse_default(survey_dfn());
    let record = catalogue.default_record_type().unwrap();

    let line = record.get_field("LINE").unwrap();
    assert_eq!(line.format, "I6");
    assert_eq!(line.repeat, 1);
    assert_eq!(line.width, Some(6));
    assert_eq!(line.kind, Some(FieldKind::Integer));

    let easting = record.get_field("EASTING").unwrap();
    assert_eq!(easting.kind, Some(FieldKind::Real));
    assert_eq!(easting.unit.as_deref(), Some("m"));
    assert_eq!(easting.long_name.as_deref(), Some("Easting"));
    assert!(easting.null_value.is_none());

    let con = record.get_field("CON").unwrap();
    assert_eq!(con.repeat, 30);
    assert_eq!(con.width, Some(10));
    assert_eq!(con.null_value.as_deref(), Some("-99.9"));
}

#[test]
fn test_rt_field_sets_record_format() {
    let (catalogue, _) = parse_default(survey_dfn());
    let comm = catalogue.get("COMM").unwrap();
    assert_eq!(comm.format.as_deref(), Some("A4"));
    assert_eq!(comm.field_names(), vec!["RT", "COMMENTS"]);
}

#[test]
fn test_data_tag_folds_onto_default() {
    // an explicit RT=DATA line and an untagged continuation line both
    // land on the empty tag
    let contents = "DEFN 1 ST=RECD,RT=DATA;LINE:I6\n\
                    DEFN 2 ST=RECD;FID:F10.1\n";
    let (catalogue, _) = parse_default(contents);

    assert_eq!(catalogue.len(), 1);
    let record = catalogue.get(DEFAULT_RECORD_TYPE).unwrap();
    assert_eq!(record.field_names(), vec!["LINE", "FID"]);
}

#[test]
fn test_data_tag_kept_when_folding_disabled() {
    let contents = "DEFN 1 ST=RECD,RT=DATA;LINE:I6\n";
    let options = DfnParseOptions {
        fold_data_tag: false,
    };
    let (catalogue, _) = parse_dfn_str(contents, &options);

    assert!(catalogue.get("DATA").is_some());
    assert!(catalogue.default_record_type().is_none());
}

#[test]
fn test_non_defn_line_warns_and_continues() {
    let contents = "this is not a definition line\n\
                    DEFN 1 ST=RECD,RT=;LINE:I6\n";
    let (catalogue, diagnostics) = parse_default(contents);

    assert_eq!(diagnostics.of_kind(WarningKind::NotDefn).count(), 1);
    let warning = diagnostics.of_kind(WarningKind::NotDefn).next().unwrap();
    assert_eq!(warning.line, Some(1));
    assert_eq!(
        catalogue.default_record_type().unwrap().field_names(),
        vec!["LINE"]
    );
}

#[test]
fn test_declaration_line_registers_empty_record_type() {
    let contents = "DEFN 1 ST=RECD,RT=PROJ\n";
    let (catalogue, diagnostics) = parse_default(contents);

    assert!(diagnostics.is_clean());
    let record = catalogue.get("PROJ").unwrap();
    assert!(record.fields.is_empty());
}

#[test]
fn test_declaration_line_never_overwrites() {
    let contents = "DEFN 1 ST=RECD,RT=PROJ;NAME:A32\n\
                    DEFN 2 ST=RECD,RT=PROJ\n";
    let (catalogue, _) = parse_default(contents);
    assert_eq!(catalogue.get("PROJ").unwrap().field_names(), vec!["NAME"]);
}

#[test]
fn test_end_defn_is_not_a_field() {
    let (catalogue, _) = parse_default(survey_dfn());
    let record = catalogue.default_record_type().unwrap();
    assert!(record.fields.iter().all(|f| f.name != END_DEFN_NAME));
}

const END_DEFN_NAME: &str = "END DEFN";

#[test]
fn test_bad_format_code_degrades() {
    let contents = "DEFN 1 ST=RECD,RT=;LINE:I6;BROKEN:???\n";
    let (catalogue, diagnostics) = parse_default(contents);

    assert_eq!(diagnostics.of_kind(WarningKind::BadFormatCode).count(), 1);

    // the field is kept, width and kind unset
    let record = catalogue.default_record_type().unwrap();
    let broken = record.get_field("BROKEN").unwrap();
    assert_eq!(broken.format, "???");
    assert!(broken.width.is_none());
    assert!(broken.kind.is_none());
    assert_eq!(broken.repeat, 1);
}

#[test]
fn test_clause_without_format_code_degrades() {
    let contents = "DEFN 1 ST=RECD,RT=;LINE:I6;NAKED\n";
    let (catalogue, diagnostics) = parse_default(contents);

    assert_eq!(diagnostics.of_kind(WarningKind::MissingFormatCode).count(), 1);
    let record = catalogue.default_record_type().unwrap();
    assert!(record.get_field("NAKED").is_some());
}

#[test]
fn test_comment_keeps_last_unmatched_chunk() {
    let contents = "DEFN 1 ST=RECD,RT=;DEPTH:F8.2:first note, UNIT=m, second note\n";
    let (catalogue, _) = parse_default(contents);
    let field = catalogue
        .default_record_type()
        .unwrap()
        .get_field("DEPTH")
        .unwrap();
    assert_eq!(field.unit.as_deref(), Some("m"));
    assert_eq!(field.comment.as_deref(), Some("second note"));
}

#[test]
fn test_duplicate_names_raise_a_warning() {
    let contents = "DEFN 1 ST=RECD,RT=;LINE:I6;LINE:I6\n";
    let (_, diagnostics) = parse_default(contents);
    assert_eq!(
        diagnostics.of_kind(WarningKind::DuplicateFieldNames).count(),
        1
    );
}
