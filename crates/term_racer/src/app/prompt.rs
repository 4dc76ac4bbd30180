use std::io::{BufRead, Read, Write};

use track_engine::EDITOR_WIDTH_RANGE;

use super::error::AppError;

// A width never needs more than a handful of digits.
const MAX_WIDTH_INPUT_BYTES: u64 = 16;

/// Asks for the editor track width and reads one bounded line of `input`.
pub(crate) fn read_track_width<R: BufRead, W: Write>(
    mut input: R,
    out: &mut W,
) -> Result<u32, AppError> {
    write!(
        out,
        "Map width ({} - {}): ",
        EDITOR_WIDTH_RANGE.start(),
        EDITOR_WIDTH_RANGE.end()
    )
    .and_then(|()| out.flush())
    .map_err(AppError::Console)?;

    let mut line = String::new();
    input
        .by_ref()
        .take(MAX_WIDTH_INPUT_BYTES)
        .read_line(&mut line)
        .map_err(AppError::PromptRead)?;

    let width = line.trim().parse::<u32>().map_err(|_| {
        AppError::InvalidWidthInput(format!(
            "you must specify an unsigned number, got {:?}",
            line.trim()
        ))
    })?;
    check_track_width(width)
}

pub(crate) fn check_track_width(width: u32) -> Result<u32, AppError> {
    if EDITOR_WIDTH_RANGE.contains(&width) {
        Ok(width)
    } else {
        Err(AppError::InvalidWidthInput(format!(
            "please specify a width within ({} - {}), got {width}",
            EDITOR_WIDTH_RANGE.start(),
            EDITOR_WIDTH_RANGE.end()
        )))
    }
}
