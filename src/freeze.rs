//! Graph freezing
//!
//! Merging a trained graph definition and its checkpoint into one deployable
//! file is done by an external tool. This module fixes the node names the
//! training graph uses and hides the tool behind [`GraphFreezer`].

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use crate::image_pipeline::{ConversionError, Result};

pub const OUTPUT_NODE_NAMES: &str = "InteractiveOutput";
pub const RESTORE_OP_NAME: &str = "save/restore_all";
pub const FILENAME_TENSOR_NAME: &str = "save/Const:0";

#[derive(Debug, Clone)]
pub struct FreezeRequest {
    /// Graph definition written at training time
    pub graph_path: PathBuf,
    /// Checkpoint prefix, e.g. `model.ckpt-1000`
    pub checkpoint_path: PathBuf,
    /// Frozen graph to produce
    pub output_path: PathBuf,
    pub output_node_names: String,
    pub restore_op_name: String,
    pub filename_tensor_name: String,
    /// Whether the graph definition is binary rather than text
    pub input_binary: bool,
    pub clear_devices: bool,
}

impl FreezeRequest {
    pub fn new(
        graph_path: impl Into<PathBuf>,
        checkpoint_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            graph_path: graph_path.into(),
            checkpoint_path: checkpoint_path.into(),
            output_path: output_path.into(),
            output_node_names: OUTPUT_NODE_NAMES.to_string(),
            restore_op_name: RESTORE_OP_NAME.to_string(),
            filename_tensor_name: FILENAME_TENSOR_NAME.to_string(),
            input_binary: false,
            clear_devices: true,
        }
    }

    /// Command line flags in the `freeze_graph` convention.
    pub fn to_args(&self) -> Vec<OsString> {
        fn flag(name: &str, value: impl AsRef<OsStr>) -> OsString {
            let mut arg = OsString::from(format!("--{}=", name));
            arg.push(value);
            arg
        }

        vec![
            flag("input_graph", &self.graph_path),
            flag("input_binary", self.input_binary.to_string()),
            flag("input_checkpoint", &self.checkpoint_path),
            flag("output_node_names", &self.output_node_names),
            flag("restore_op_name", &self.restore_op_name),
            flag("filename_tensor_name", &self.filename_tensor_name),
            flag("output_graph", &self.output_path),
            flag("clear_devices", self.clear_devices.to_string()),
        ]
    }
}

pub trait GraphFreezer {
    /// Produces the frozen graph and returns its path.
    fn freeze(&self, request: &FreezeRequest) -> Result<PathBuf>;
}

/// Runs an external freeze tool supplied by the environment.
#[derive(Debug, Clone)]
pub struct CommandFreezer {
    program: PathBuf,
    base_args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl Default for CommandFreezer {
    fn default() -> Self {
        Self::new("python", ["-m", "tensorflow.python.tools.freeze_graph"])
    }
}

impl CommandFreezer {
    pub fn new<I, S>(program: impl Into<PathBuf>, base_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            base_args: base_args.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
        }
    }

    /// Sets an environment variable for the tool, e.g. to register native
    /// operator libraries before the graph is loaded.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl GraphFreezer for CommandFreezer {
    #[instrument(skip(self, request), fields(graph = %request.graph_path.display()))]
    fn freeze(&self, request: &FreezeRequest) -> Result<PathBuf> {
        if !request.graph_path.is_file() {
            return Err(ConversionError::FreezeError(format!(
                "graph definition not found: {}",
                request.graph_path.display()
            )));
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .args(request.to_args())
            .envs(self.envs.iter().map(|(k, v)| (k, v)));

        debug!("Running {:?}", command);

        let output = command.output().map_err(|e| {
            ConversionError::FreezeError(format!("failed to run {}: {}", self.program.display(), e))
        })?;

        if !output.status.success() {
            return Err(ConversionError::FreezeError(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if !request.output_path.is_file() {
            return Err(ConversionError::FreezeError(format!(
                "tool finished but {} was not written",
                request.output_path.display()
            )));
        }

        info!(output = %request.output_path.display(), "Graph frozen");
        Ok(request.output_path.clone())
    }
}
