use crate::context::CheckContext;
use contract_protocol::{CheckId, Violation};

/// One error per reachable file whose imports could not be extracted.
pub fn check(ctx: &CheckContext<'_>) -> Vec<Violation> {
    ctx.reachable
        .parse_failures()
        .map(|(file, failure)| {
            Violation::error(CheckId::Parse, file.rel_path(), failure.message.clone())
                .with_hint("Imports of this file were not followed")
        })
        .collect()
}
