// src/job/render.rs

//! Assembly of `render-images` arguments.
//!
//! Front-ends collect prompts and render options, validate them here and turn
//! them into the flat argument list carried by [`JobKind::RenderImages`]. The
//! registry passes that list to the engine untouched.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::JobKind;

static ASPECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+:\d+$").expect("static regex"));

pub const DEFAULT_NUM: u32 = 3;
pub const DEFAULT_SECONDS: f64 = 2.0;
pub const DEFAULT_FPS: u32 = 24;
pub const DEFAULT_OUT_NAME: &str = "out.mp4";
pub const DEFAULT_ASPECT: &str = "1:1";

#[derive(Error, Debug, PartialEq)]
pub enum RenderRequestError {
    #[error("at least one prompt is required (separate multiple prompts with ';')")]
    NoPrompt,

    #[error("aspect ratio must look like W:H, got '{0}'")]
    BadAspect(String),

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("durations must be positive numbers, got '{0}'")]
    BadDuration(String),

    #[error("output file name must not be empty")]
    NoOutputName,
}

/// Either one prompt repeated `num` times, or a `;`-separated block where each
/// entry becomes one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompts {
    Single { prompt: String, num: u32 },
    Multiple(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub prompts: Prompts,
    pub seconds: f64,
    pub fps: u32,
    pub out_name: String,
    pub aspect: String,
    /// Per-frame durations, separated by commas, semicolons or spaces.
    pub durations: String,
}

impl RenderRequest {
    pub fn single(prompt: impl Into<String>, num: u32) -> Self {
        Self::with_prompts(Prompts::Single {
            prompt: prompt.into(),
            num,
        })
    }

    pub fn multiple(block: impl Into<String>) -> Self {
        Self::with_prompts(Prompts::Multiple(block.into()))
    }

    fn with_prompts(prompts: Prompts) -> Self {
        Self {
            prompts,
            seconds: DEFAULT_SECONDS,
            fps: DEFAULT_FPS,
            out_name: DEFAULT_OUT_NAME.to_string(),
            aspect: DEFAULT_ASPECT.to_string(),
            durations: String::new(),
        }
    }

    /// Number of frames the engine will render.
    pub fn frame_count(&self) -> usize {
        match &self.prompts {
            Prompts::Single { num, .. } => *num as usize,
            Prompts::Multiple(block) => split_prompts(block).len().max(1),
        }
    }

    pub fn validate(&self) -> Result<(), RenderRequestError> {
        match &self.prompts {
            Prompts::Single { prompt, num } => {
                if prompt.trim().is_empty() {
                    return Err(RenderRequestError::NoPrompt);
                }
                check_range("num", f64::from(*num), 1.0, 32.0)?;
            }
            Prompts::Multiple(block) => {
                if split_prompts(block).is_empty() {
                    return Err(RenderRequestError::NoPrompt);
                }
            }
        }

        check_range("seconds", self.seconds, 0.25, 20.0)?;
        check_range("fps", f64::from(self.fps), 12.0, 60.0)?;

        if self.out_name.trim().is_empty() {
            return Err(RenderRequestError::NoOutputName);
        }

        let aspect = self.aspect.trim();
        if !aspect.is_empty() && !ASPECT_RE.is_match(aspect) {
            return Err(RenderRequestError::BadAspect(aspect.to_string()));
        }

        for part in split_durations(&self.durations) {
            match part.parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => {}
                _ => return Err(RenderRequestError::BadDuration(part.to_string())),
            }
        }

        Ok(())
    }

    /// Serialize into engine arguments (without the `render-images` token).
    ///
    /// Order: prompt flags, `--seconds`, `--fps`, `--out`, then `--aspect`
    /// and `--durations` when set.
    pub fn to_args(&self, output_dir: &Path) -> Vec<String> {
        let mut args = Vec::new();

        match &self.prompts {
            Prompts::Multiple(block) => {
                // The engine splits the block on ';' itself.
                args.push("--prompts".to_string());
                args.push(block.trim().to_string());
            }
            Prompts::Single { prompt, num } => {
                args.push("--prompt".to_string());
                args.push(prompt.trim().to_string());
                args.push("--num".to_string());
                args.push(num.to_string());
            }
        }

        args.push("--seconds".to_string());
        args.push(format!("{:?}", self.seconds));
        args.push("--fps".to_string());
        args.push(self.fps.to_string());
        args.push("--out".to_string());
        args.push(
            output_dir
                .join(self.out_name.trim())
                .to_string_lossy()
                .into_owned(),
        );

        let aspect = self.aspect.trim();
        if !aspect.is_empty() {
            args.push("--aspect".to_string());
            args.push(aspect.to_string());
        }

        let durations = split_durations(&self.durations);
        if !durations.is_empty() {
            args.push("--durations".to_string());
            args.extend(durations.into_iter().map(str::to_string));
        }

        args
    }

    /// Validate and build the job kind in one go.
    pub fn into_job_kind(self, output_dir: &Path) -> Result<JobKind, RenderRequestError> {
        self.validate()?;
        Ok(JobKind::RenderImages {
            args: self.to_args(output_dir),
        })
    }
}

/// Split a prompt block on `;`, trimming entries and dropping empty ones.
pub fn split_prompts(block: &str) -> Vec<String> {
    block
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split(';')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn split_durations(csv: &str) -> Vec<&str> {
    csv.split([',', ' ', ';'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), RenderRequestError> {
    if !value.is_finite() || value < min || value > max {
        return Err(RenderRequestError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn out_dir() -> PathBuf {
        PathBuf::from("/srv/releases")
    }

    #[test]
    fn single_prompt_args_in_engine_order() {
        let req = RenderRequest::single("x", 3);
        assert_eq!(
            req.to_args(&out_dir()),
            vec![
                "--prompt", "x", "--num", "3", "--seconds", "2.0", "--fps", "24", "--out",
                "/srv/releases/out.mp4", "--aspect", "1:1",
            ]
        );
    }

    #[test]
    fn multiple_prompts_passed_as_one_block() {
        let mut req = RenderRequest::multiple("  a; b ;c  ");
        req.aspect = String::new();
        req.durations = "2, 1.5;3".to_string();

        let args = req.to_args(&out_dir());
        assert_eq!(&args[..2], &["--prompts", "a; b ;c"]);
        assert!(!args.contains(&"--aspect".to_string()));
        assert_eq!(&args[args.len() - 4..], &["--durations", "2", "1.5", "3"]);
        assert_eq!(req.frame_count(), 3);
    }

    #[test]
    fn split_prompts_drops_blanks() {
        assert_eq!(split_prompts("one;\r\n ; two;;"), vec!["one", "two"]);
    }

    #[test]
    fn validation_rejects_bad_input() {
        assert_eq!(
            RenderRequest::single("   ", 3).validate(),
            Err(RenderRequestError::NoPrompt)
        );
        assert_eq!(
            RenderRequest::multiple(" ; ;").validate(),
            Err(RenderRequestError::NoPrompt)
        );

        let mut req = RenderRequest::single("x", 3);
        req.aspect = "wide".to_string();
        assert_eq!(
            req.validate(),
            Err(RenderRequestError::BadAspect("wide".to_string()))
        );

        let mut req = RenderRequest::single("x", 3);
        req.fps = 120;
        assert!(matches!(
            req.validate(),
            Err(RenderRequestError::OutOfRange { field: "fps", .. })
        ));

        let mut req = RenderRequest::single("x", 3);
        req.durations = "1,-2".to_string();
        assert_eq!(
            req.validate(),
            Err(RenderRequestError::BadDuration("-2".to_string()))
        );
    }

    #[test]
    fn validation_rejects_non_finite_numbers() {
        for seconds in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut req = RenderRequest::single("x", 3);
            req.seconds = seconds;
            assert!(matches!(
                req.validate(),
                Err(RenderRequestError::OutOfRange { field: "seconds", .. })
            ));
        }

        for durations in ["inf,2", "1;NaN"] {
            let mut req = RenderRequest::single("x", 3);
            req.durations = durations.to_string();
            assert!(matches!(
                req.validate(),
                Err(RenderRequestError::BadDuration(_))
            ));
        }
    }

    #[test]
    fn into_job_kind_wraps_args() {
        let kind = RenderRequest::single("x", 1).into_job_kind(&out_dir()).unwrap();
        match kind {
            JobKind::RenderImages { args } => assert_eq!(args[1], "x"),
            other => panic!("expected RenderImages, got {other:?}"),
        }
    }
}
