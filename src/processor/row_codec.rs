//! Packed row format ("Mountain Panic" format).
//!
//! A row of 8 tiles becomes:
//!   • one presence byte, bit `7 - i` set when column `i` holds a tile;
//!   • then, for the occupied columns left to right, either
//!       - the tile byte itself (runs of 1 or 2), or
//!       - `0xFn` followed by the tile byte: the tile repeats `n` times (n ≥ 3).
//!
//! An empty row is the single byte `0x00`.

use crate::error::{ExportError, Result};
use crate::model::{ROW_WIDTH, TileRow};
use crate::processor::tile_flags::{MAX_TILE, TileFlagTable};

/// High nibble marking a run-length control byte.
pub const RLE_MARKER: u8 = 0xf0;
/// Shortest run worth a control byte.
pub const RLE_THRESHOLD: usize = 3;
/// Longest run the low nibble can hold.
pub const MAX_RUN: usize = 0x0f;

/// Pack one row. With `flags`, every emitted tile byte goes through the
/// flag table first; without, tile values are written as-is.
pub fn pack_row(row: &[u8], flags: Option<&TileFlagTable>) -> Result<Vec<u8>> {
    let row = check_row(row)?;

    let mask = presence_mask(row);
    if mask == 0 {
        return Ok(vec![0]);
    }

    let mut out = Vec::with_capacity(ROW_WIDTH + 1);
    out.push(mask);

    let mut idx = 0;
    while idx < ROW_WIDTH {
        let tile = row[idx];
        let run = run_length(row, idx);

        if tile == 0 {
            if run >= RLE_THRESHOLD {
                return Err(ExportError::UnexpectedByte {
                    byte: tile,
                    column: idx,
                });
            }
            idx += 1;
            continue;
        }

        let byte = match flags {
            Some(table) => table.resolve(tile)?,
            None => tile,
        };

        if run < RLE_THRESHOLD {
            out.extend(std::iter::repeat_n(byte, run));
        } else {
            out.push(RLE_MARKER | run as u8);
            out.push(byte);
        }
        idx += run;
    }

    Ok(out)
}

/// Decode one packed row written without flags. Returns the row and the
/// number of bytes consumed from `bytes`.
pub fn unpack_row(bytes: &[u8]) -> Result<(TileRow, usize)> {
    let mask = *bytes
        .first()
        .ok_or_else(|| ExportError::MalformedRow("empty packed row".into()))?;

    let mut row = [0u8; ROW_WIDTH];
    let mut pos = 1;
    let mut columns = (0..ROW_WIDTH).filter(|c| mask & (0x80u8 >> c) != 0);

    let next_byte = |pos: &mut usize| -> Result<u8> {
        let b = bytes.get(*pos).copied().ok_or_else(|| {
            ExportError::MalformedRow(format!("packed row truncated after {} bytes", *pos))
        })?;
        *pos += 1;
        Ok(b)
    };

    while let Some(col) = columns.next() {
        let b = next_byte(&mut pos)?;
        if b & RLE_MARKER != RLE_MARKER {
            row[col] = check_tile(b, col)?;
            continue;
        }

        let run = (b & !RLE_MARKER) as usize;
        if run < RLE_THRESHOLD {
            return Err(ExportError::MalformedRow(format!(
                "run of {run} at column {col}"
            )));
        }
        let value = check_tile(next_byte(&mut pos)?, col)?;
        row[col] = value;

        let mut prev = col;
        for _ in 1..run {
            match columns.next() {
                Some(c) if c == prev + 1 => {
                    row[c] = value;
                    prev = c;
                }
                _ => {
                    return Err(ExportError::MalformedRow(format!(
                        "run of {run} at column {col} does not match the presence mask {mask:#04x}"
                    )));
                }
            }
        }
    }

    Ok((row, pos))
}

/// Bit `7 - i` set iff column `i` is non-empty.
pub fn presence_mask(row: &TileRow) -> u8 {
    row.iter()
        .enumerate()
        .filter(|(_, t)| **t != 0)
        .fold(0u8, |mask, (i, _)| mask | (0x80u8 >> i))
}

/// Length of the run of equal non-zero tiles starting at `start`. Zero
/// tiles never form runs.
fn run_length(row: &TileRow, start: usize) -> usize {
    let tile = row[start];
    if tile == 0 {
        return 1;
    }
    row[start..]
        .iter()
        .take(MAX_RUN)
        .take_while(|&&t| t == tile)
        .count()
}

fn check_row(row: &[u8]) -> Result<&TileRow> {
    let row: &TileRow = row.try_into().map_err(|_| {
        ExportError::MalformedRow(format!(
            "expected {ROW_WIDTH} tiles, got {}",
            row.len()
        ))
    })?;
    for (col, &tile) in row.iter().enumerate() {
        if tile > MAX_TILE {
            return Err(ExportError::MalformedRow(format!(
                "tile {tile} at column {col} is above {MAX_TILE}"
            )));
        }
    }
    Ok(row)
}

fn check_tile(tile: u8, col: usize) -> Result<u8> {
    if tile == 0 || tile > MAX_TILE {
        return Err(ExportError::MalformedRow(format!(
            "bad tile byte {tile:#04x} at column {col}"
        )));
    }
    Ok(tile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(row: [u8; 8]) -> Vec<u8> {
        pack_row(&row, None).expect("pack ok")
    }

    #[test]
    fn test_nil_or_bad_slice() {
        assert!(matches!(
            pack_row(&[], None),
            Err(ExportError::MalformedRow(_))
        ));
        assert!(matches!(
            pack_row(&[0], None),
            Err(ExportError::MalformedRow(_))
        ));
        assert!(matches!(
            pack_row(&[1; 9], None),
            Err(ExportError::MalformedRow(_))
        ));
    }

    #[test]
    fn test_tile_above_31_rejected() {
        let err = pack_row(&[0, 0, 32, 0, 0, 0, 0, 0], None).unwrap_err();
        assert!(
            err.to_string().contains("column 2"),
            "got error message: {err}"
        );
    }

    #[test]
    fn test_all_zero_row() {
        assert_eq!(pack([0; 8]), vec![0x00]);
    }

    #[test]
    fn test_run_length_vectors() {
        let cases: &[([u8; 8], &[u8])] = &[
            ([0, 0, 0, 0, 0, 1, 1, 1], &[0x07, 0xf3, 1]),
            ([8, 0, 0, 0, 0, 0, 0, 0], &[0x80, 8]),
            ([0, 0, 0, 0, 0, 0, 0, 8], &[0x01, 8]),
            ([1, 1, 1, 0, 0, 0, 0, 0], &[0xe0, 0xf3, 1]),
            ([0, 0, 1, 1, 1, 0, 0, 0], &[0x38, 0xf3, 1]),
            ([0, 0, 1, 1, 0, 0, 0, 0], &[0x30, 1, 1]),
            ([0, 1, 1, 1, 0, 1, 1, 1], &[0x77, 0xf3, 1, 0xf3, 1]),
            ([1, 1, 1, 1, 1, 1, 1, 1], &[0xff, 0xf8, 1]),
            ([1, 1, 1, 1, 1, 0, 1, 1], &[0xfb, 0xf5, 1, 1, 1]),
        ];

        for (row, expected) in cases {
            assert_eq!(pack(*row), *expected, "row {row:?}");
        }
    }

    #[test]
    fn test_run_threshold() {
        // two repeats stay literal, three switch to a control byte
        assert_eq!(pack([5, 5, 0, 0, 0, 0, 0, 0]), vec![0xc0, 5, 5]);
        assert_eq!(pack([5, 5, 5, 0, 0, 0, 0, 0]), vec![0xe0, 0xf3, 5]);
    }

    #[test]
    fn test_mixed_runs() {
        assert_eq!(
            pack([1, 2, 2, 2, 2, 3, 3, 0]),
            vec![0xfe, 1, 0xf4, 2, 3, 3]
        );
        assert_eq!(pack([4, 0, 4, 0, 4, 0, 4, 0]), vec![0xaa, 4, 4, 4, 4]);
    }

    #[test]
    fn test_mask_marks_occupied_columns() {
        let rows = [
            [0, 3, 0, 0, 9, 9, 9, 0],
            [7, 0, 0, 0, 0, 0, 0, 7],
            [0, 0, 0, 1, 0, 0, 0, 0],
        ];
        for row in rows {
            let packed = pack(row);
            for (i, &tile) in row.iter().enumerate() {
                let bit = packed[0] & (0x80u8 >> i) != 0;
                assert_eq!(bit, tile != 0, "row {row:?} column {i}");
            }
        }
    }

    #[test]
    fn test_flags_applied_to_emitted_bytes() {
        let table = TileFlagTable::default();

        // tile 1 → climbable, index 0
        assert_eq!(
            pack_row(&[1; 8], Some(&table)).unwrap(),
            vec![0xff, 0xf8, 0x80]
        );
        // tile 3 → collidable, index 2
        assert_eq!(
            pack_row(&[3, 3, 0, 0, 0, 0, 0, 2], Some(&table)).unwrap(),
            vec![0xc1, 0x42, 0x42, 0x01]
        );
    }

    #[test]
    fn test_round_trip() {
        let rows = [
            [0; 8],
            [1, 1, 1, 1, 1, 0, 1, 1],
            [0, 1, 1, 1, 0, 1, 1, 1],
            [1, 2, 2, 2, 2, 3, 3, 0],
            [31, 30, 29, 28, 27, 26, 25, 24],
            [6, 6, 6, 6, 6, 6, 6, 6],
        ];
        for row in rows {
            let packed = pack(row);
            let (decoded, used) = unpack_row(&packed).unwrap();
            assert_eq!(decoded, row);
            assert_eq!(used, packed.len());
        }
    }

    #[test]
    fn test_unpack_reports_consumed_bytes() {
        // two rows back to back
        let mut bytes = pack([0, 0, 1, 1, 1, 0, 0, 0]);
        bytes.extend(pack([8, 0, 0, 0, 0, 0, 0, 0]));

        let (first, used) = unpack_row(&bytes).unwrap();
        assert_eq!(first, [0, 0, 1, 1, 1, 0, 0, 0]);
        assert_eq!(used, 3);

        let (second, _) = unpack_row(&bytes[used..]).unwrap();
        assert_eq!(second, [8, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unpack_malformed() {
        assert!(unpack_row(&[]).is_err());
        // truncated
        assert!(unpack_row(&[0xc0, 1]).is_err());
        // run longer than the mask allows
        assert!(unpack_row(&[0xc0, 0xf3, 1]).is_err());
        // run across a gap
        assert!(unpack_row(&[0xb0, 0xf3, 1]).is_err());
        // control byte with a short run
        assert!(unpack_row(&[0xc0, 0xf2, 1]).is_err());
    }
}
