//! Shared fixtures for definition-parser tests.

mod parser_tests;

use crate::dfn::catalogue::RecordTypeCatalogue;
use crate::dfn::diagnostics::DfnDiagnostics;
use crate::dfn::parser::{DfnParseOptions, parse_dfn_str};

/// Definition text modelled on a real airborne-survey package.
pub fn survey_dfn() -> &'static str {
    "DEFN   ST=RECD,RT=COMM;RT:A4;COMMENTS:A76\n\
     DEFN 1 ST=RECD,RT=;LINE:I6\n\
     DEFN 2 ST=RECD,RT=;EASTING:F12.2:UNIT=m,NAME=Easting\n\
     DEFN 3 ST=RECD,RT=;CON:30F10.5:NULL=-99.9\n\
     DEFN 4 ST=RECD,RT=;END DEFN\n"
}

pub fn parse_default(contents: &str) -> (RecordTypeCatalogue, DfnDiagnostics) {
    parse_dfn_str(contents, &DfnParseOptions::default())
}
