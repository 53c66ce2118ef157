// src/output.rs
use ndarray::Array2;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Long-format heatmap: one `x,t,density` row per cell
pub fn write_density_to_csv<P: AsRef<Path>>(
    filename: P,
    x_grid: &[f64],
    t_grid: &[f64],
    density: &Array2<f64>,
) -> io::Result<()> {
    if density.dim() != (x_grid.len(), t_grid.len()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "density shape {:?} does not match grids ({}, {})",
                density.dim(),
                x_grid.len(),
                t_grid.len()
            ),
        ));
    }
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "x,t,density")?;
    for ((i, j), p) in density.indexed_iter() {
        writeln!(file, "{},{},{}", x_grid[i], t_grid[j], p)?;
    }
    file.flush()
}

/// One `path_id,step,t,x` row per trajectory point
pub fn write_paths_to_csv<P: AsRef<Path>>(
    filename: P,
    t_grid: &[f64],
    paths: &[Vec<f64>],
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "path_id,step,t,x")?;
    for (id, path) in paths.iter().enumerate() {
        for (step, (t, x)) in t_grid.iter().zip(path).enumerate() {
            writeln!(file, "{},{},{},{}", id, step, t, x)?;
        }
    }
    file.flush()
}

pub fn write_summary_to_csv<P: AsRef<Path>>(
    filename: P,
    summary_data: &[(&str, String)],
) -> io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "key,value")?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    Ok(())
}

/// Pretty-printed JSON of any simulation result or configuration
pub fn write_json<P: AsRef<Path>, T: Serialize>(filename: P, value: &T) -> io::Result<()> {
    let file = BufWriter::new(File::create(filename)?);
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
