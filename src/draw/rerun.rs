use anyhow::{Result, ensure};
use rerun as rr;

use super::config::{PlotConfig, Rgba};
use crate::pipeline::PipelineOutcome;
use crate::spectral::{LocalMesh, PhysicalField};

fn color(rgba: Rgba) -> rr::Color {
    let (r, g, b, a) = rgba;
    rr::Color(rr::Rgba32::from_linear_unmultiplied_rgba_f32(r, g, b, a))
}

/// Linear blend of two colors, `t` in 0.0..=1.0.
fn blend(lo: Rgba, hi: Rgba, t: f32) -> Rgba {
    (
        lo.0 + (hi.0 - lo.0) * t,
        lo.1 + (hi.1 - lo.1) * t,
        lo.2 + (hi.2 - lo.2) * t,
        lo.3 + (hi.3 - lo.3) * t,
    )
}

/// Maps a normalized value (0-1) to the low → mid → high color ramp.
fn ramp(config: &PlotConfig, t: f32) -> Rgba {
    if t < 0.5 {
        blend(config.color_low, config.color_mid, t * 2.0)
    } else {
        blend(config.color_mid, config.color_high, (t - 0.5) * 2.0)
    }
}

/// Spawns a viewer and connects to it.
pub fn start_session(config: &PlotConfig) -> Result<rr::RecordingStream> {
    let session = rr::RecordingStreamBuilder::new(config.session_name.as_str()).spawn()?;

    Ok(session)
}

/// Logs slice `k` of `field` as a colored height field.
pub fn plot_slice(
    session: &rr::RecordingStream,
    config: &PlotConfig,
    name: &str,
    mesh: &LocalMesh,
    field: &PhysicalField,
    k: usize,
) -> Result<()> {
    let [nx, ny, nz] = mesh.shape();
    ensure!(
        field.shape() == &[nx, ny, nz][..],
        "field shape {:?} does not match mesh shape {:?}",
        field.shape(),
        [nx, ny, nz]
    );
    ensure!(k < nz, "slice index {} out of range (N2 = {})", k, nz);

    let slice = field.slice(ndarray::s![.., .., k]);
    let (min, max) = slice
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let range = if max - min > 1e-300 { max - min } else { 1.0 };

    let mut points: Vec<rr::Vec3D> = Vec::with_capacity(nx * ny);
    let mut colors: Vec<rr::Color> = Vec::with_capacity(nx * ny);
    for ((i, j), v) in slice.indexed_iter() {
        points.push(rr::Vec3D([
            mesh.x[i] as f32,
            mesh.y[j] as f32,
            config.height_scale * *v as f32,
        ]));
        colors.push(color(ramp(config, ((v - min) / range) as f32)));
    }
    let radii = vec![config.point_radius; points.len()];

    session.log_static(
        config.entity(name),
        &rr::Points3D::new(points).with_radii(radii).with_colors(colors),
    )?;

    Ok(())
}

/// Logs the computed, exact and error fields of a run on slice `k`.
pub fn plot_outcome(
    session: &rr::RecordingStream,
    config: &PlotConfig,
    outcome: &PipelineOutcome,
    k: usize,
) -> Result<()> {
    plot_slice(session, config, "computed", &outcome.mesh, &outcome.computed, k)?;
    plot_slice(session, config, "exact", &outcome.mesh, &outcome.exact, k)?;
    plot_slice(session, config, "error", &outcome.mesh, &outcome.error(), k)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray as nd;

    fn buffered_session() -> rr::RecordingStream {
        rr::RecordingStreamBuilder::new("test").buffered().unwrap()
    }

    fn mesh() -> LocalMesh {
        LocalMesh {
            x: nd::Array1::linspace(-1.0, 1.0, 4),
            y: nd::Array1::linspace(0.0, 3.0, 3),
            z: nd::Array1::linspace(0.0, 1.0, 2),
        }
    }

    #[test]
    fn test_ramp_endpoints() {
        let config = PlotConfig::new();
        assert_eq!(ramp(&config, 0.0), config.color_low);
        assert_eq!(ramp(&config, 0.5), config.color_mid);
        assert_eq!(ramp(&config, 1.0), config.color_high);
    }

    #[test]
    fn test_plot_slice_is_ok() {
        let session = buffered_session();
        let config = PlotConfig::new();
        let field = nd::Array3::from_shape_fn((4, 3, 2), |(i, j, k)| (i + j + k) as f64);
        plot_slice(&session, &config, "field", &mesh(), &field, 1).unwrap();

        // Constant field: degenerate color range
        let flat = nd::Array3::from_elem((4, 3, 2), 2.0);
        plot_slice(&session, &config, "flat", &mesh(), &flat, 0).unwrap();
    }

    #[test]
    fn test_plot_slice_rejects_bad_input() {
        let session = buffered_session();
        let config = PlotConfig::new();
        let field = nd::Array3::<f64>::zeros((4, 3, 2));
        assert!(plot_slice(&session, &config, "field", &mesh(), &field, 2).is_err());
        let wrong = nd::Array3::<f64>::zeros((4, 4, 2));
        assert!(plot_slice(&session, &config, "field", &mesh(), &wrong, 0).is_err());
    }
}
