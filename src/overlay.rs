//! Composite brain-overlay snapshots via external neuroimaging tools.
//!
//! Three blocking invocations, each consuming the previous step's output:
//! FSL `overlay` composites the two volumes, FSL `slicer` renders the three
//! anatomical views as one tiled image, and ImageMagick `convert` scales the
//! tile and trims its border padding. The two intermediates live in scoped
//! temporary files that are removed on every exit path, success or failure.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use log::{debug, info};

use crate::{Error, Result};

/// Synchronous command execution, abstracted so the pipeline can be tested
/// without the external tools installed.
pub trait CommandRunner {
    /// Run `tool` with `args`, wait for it, and surface a non-zero exit as
    /// an error.
    fn run(&self, tool: &'static str, args: &[OsString]) -> Result<()>;
}

/// Runs tools found on `PATH` via `std::process::Command`.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, tool: &'static str, args: &[OsString]) -> Result<()> {
        debug!("running {} {:?}", tool, args);
        let status = Command::new(tool)
            .args(args)
            .status()
            .map_err(|e| Error::ToolLaunch { tool, source: e })?;
        if !status.success() {
            return Err(Error::ToolFailed { tool, status });
        }
        Ok(())
    }
}

/// Write a combined underlay+overlay snapshot to `output`: overlay values
/// are shown only within `[min, max]`. The first failing step aborts the
/// pipeline; later steps never run and `output` is never written.
pub fn snapshot_overlay(
    underlay: &Path,
    overlay: &Path,
    output: &Path,
    min: f64,
    max: f64,
) -> Result<()> {
    snapshot_overlay_with(&SystemRunner, underlay, overlay, output, min, max)
}

/// [`snapshot_overlay`] with an explicit command runner.
pub fn snapshot_overlay_with(
    runner: &dyn CommandRunner,
    underlay: &Path,
    overlay: &Path,
    output: &Path,
    min: f64,
    max: f64,
) -> Result<()> {
    let tmp_vol = tempfile::Builder::new()
        .prefix("connviz-")
        .suffix(".nii.gz")
        .tempfile()
        .map_err(Error::TempFile)?;
    let tmp_img = tempfile::Builder::new()
        .prefix("connviz-")
        .suffix(".png")
        .tempfile()
        .map_err(Error::TempFile)?;

    // Composite the two volumes into one, overlay windowed to [min, max].
    runner.run(
        "overlay",
        &[
            OsString::from("0"),
            OsString::from("1"),
            underlay.into(),
            OsString::from("-a"),
            overlay.into(),
            OsString::from(min.to_string()),
            OsString::from(max.to_string()),
            tmp_vol.path().into(),
        ],
    )?;

    // Axial, sagittal and coronal views tiled into a single image.
    runner.run(
        "slicer",
        &[
            tmp_vol.path().into(),
            OsString::from("-a"),
            tmp_img.path().into(),
            OsString::from("-t"),
        ],
    )?;

    // The slicer tile is small; scale it up and trim the uniform border.
    runner.run(
        "convert",
        &[
            tmp_img.path().into(),
            OsString::from("-scale"),
            OsString::from("300%"),
            OsString::from("-trim"),
            output.into(),
        ],
    )?;

    info!("overlay snapshot written to {:?}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Records invocations instead of running anything; optionally fails on
    /// the nth call.
    struct RecordingRunner {
        calls: RefCell<Vec<(&'static str, Vec<String>)>>,
        fail_on: Option<usize>,
    }

    impl RecordingRunner {
        fn new(fail_on: Option<usize>) -> Self {
            RecordingRunner {
                calls: RefCell::new(Vec::new()),
                fail_on,
            }
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, tool: &'static str, args: &[OsString]) -> Result<()> {
            let mut calls = self.calls.borrow_mut();
            let n = calls.len();
            calls.push((
                tool,
                args.iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
            ));
            if self.fail_on == Some(n) {
                return Err(Error::ToolLaunch {
                    tool,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Ok(())
        }
    }

    fn run_pipeline(runner: &RecordingRunner) -> Result<()> {
        snapshot_overlay_with(
            runner,
            Path::new("brain.nii.gz"),
            Path::new("act.nii.gz"),
            Path::new("out.png"),
            0.1,
            0.5,
        )
    }

    #[test]
    fn three_tools_in_order_chained_through_temps() {
        let runner = RecordingRunner::new(None);
        run_pipeline(&runner).unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, "overlay");
        assert_eq!(calls[1].0, "slicer");
        assert_eq!(calls[2].0, "convert");

        // overlay 0 1 <underlay> -a <overlay> <min> <max> <tmp_vol>
        let overlay_args = &calls[0].1;
        assert_eq!(
            &overlay_args[..7],
            &["0", "1", "brain.nii.gz", "-a", "act.nii.gz", "0.1", "0.5"]
        );
        let tmp_vol = overlay_args[7].clone();
        assert!(tmp_vol.ends_with(".nii.gz"));

        // slicer <tmp_vol> -a <tmp_img> -t
        let slicer_args = &calls[1].1;
        assert_eq!(slicer_args[0], tmp_vol);
        assert_eq!(slicer_args[1], "-a");
        let tmp_img = slicer_args[2].clone();
        assert!(tmp_img.ends_with(".png"));
        assert_eq!(slicer_args[3], "-t");

        // convert <tmp_img> -scale 300% -trim <output>
        let convert_args = &calls[2].1;
        assert_eq!(convert_args[0], tmp_img);
        assert_eq!(&convert_args[1..], &[
            "-scale".to_string(),
            "300%".to_string(),
            "-trim".to_string(),
            "out.png".to_string(),
        ]);
    }

    #[test]
    fn temp_files_are_removed_after_success() {
        let runner = RecordingRunner::new(None);
        run_pipeline(&runner).unwrap();

        let calls = runner.calls.borrow();
        let tmp_vol = PathBuf::from(&calls[0].1[7]);
        let tmp_img = PathBuf::from(&calls[1].1[2]);
        assert!(!tmp_vol.exists());
        assert!(!tmp_img.exists());
    }

    #[test]
    fn compositor_failure_stops_the_pipeline() {
        let runner = RecordingRunner::new(Some(0));
        let err = run_pipeline(&runner).unwrap_err();
        assert!(matches!(err, Error::ToolLaunch { tool: "overlay", .. }));

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(!Path::new("out.png").exists());

        // Intermediates are cleaned up on the failure path too.
        let tmp_vol = PathBuf::from(&calls[0].1[7]);
        assert!(!tmp_vol.exists());
    }

    #[test]
    fn slicer_failure_skips_the_converter() {
        let runner = RecordingRunner::new(Some(1));
        let err = run_pipeline(&runner).unwrap_err();
        assert!(matches!(err, Error::ToolLaunch { tool: "slicer", .. }));
        assert_eq!(runner.calls.borrow().len(), 2);
    }
}
