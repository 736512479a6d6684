// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};

use crate::error::{Result, TofError};

fn check_npy_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("npy") => Ok(()),
        Some(ext) => Err(TofError::UnsupportedFileFormat(ext.to_string())),
        None => Err(TofError::UnsupportedFileFormat("(no extension)".to_string())),
    }
}

/// Load a per-cell or per-face scalar field from a .npy file.
///
/// Accepts any array shape; only the total element count must match
/// `expected_len`. f32 data is promoted to f64.
pub fn load_field(path: &Path, name: &'static str, expected_len: usize) -> Result<Vec<f64>> {
    check_npy_extension(path)?;
    // Try f64 first, then f32 with promotion.
    let arr: ArrayD<f64> = match ndarray_npy::read_npy(path) {
        Ok(a) => a,
        Err(_) => {
            let arr32: ArrayD<f32> = ndarray_npy::read_npy(path)
                .map_err(|e| TofError::UnsupportedDtype(format!("{}", e)))?;
            arr32.mapv(|v| v as f64)
        }
    };

    let data: Vec<f64> = arr.as_standard_layout().iter().copied().collect();
    if data.len() != expected_len {
        return Err(TofError::LengthMismatch {
            name,
            expected: expected_len,
            got: data.len(),
        });
    }
    Ok(data)
}

/// Save a scalar field to a .npy file with the given logical shape.
pub fn save_field(path: &Path, data: &[f64], shape: &[usize]) -> Result<()> {
    check_npy_extension(path)?;
    let arr = ArrayD::from_shape_vec(IxDyn(shape), data.to_vec())
        .map_err(|e| TofError::Other(format!("shape error: {}", e)))?;
    ndarray_npy::write_npy(path, &arr)
        .map_err(|e| TofError::Other(format!("npy write error: {}", e)))?;
    Ok(())
}
