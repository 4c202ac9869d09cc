use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::{
    channels::DecodedChannels,
    common::error::{ConversionError, Result},
    conversions::{BatchReport, ChannelCodec, FileKind, FolderReport, is_progress_tick, load_models, progress_line},
    exr_io::{ChannelReader, ConversionConfig, ExrChannelReader, ExrWriter, StandardExrWriter},
};

/// Walks dataset folders and converts every truth and input file in them.
pub struct FolderConverter<R: ChannelReader, W: ExrWriter> {
    codec: ChannelCodec<R, W>,
}

impl FolderConverter<ExrChannelReader, StandardExrWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            codec: ChannelCodec::new(config),
        }
    }
}

impl<R: ChannelReader, W: ExrWriter> FolderConverter<R, W> {
    pub fn with_codec(codec: ChannelCodec<R, W>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &ChannelCodec<R, W> {
        &self.codec
    }

    pub fn config(&self) -> &ConversionConfig {
        self.codec.config()
    }

    /// Decodes one file and writes it back in the normalized layout.
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        kind: FileKind,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        debug!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting {:?} file",
            kind
        );

        let image = self.codec.decode_read(input_path, kind)?;
        match image.channels {
            DecodedChannels::Truth(data) => {
                // Truth files are repacked at the configured size, so the file's own
                // geometry has to match it, not just the sample count.
                let config = self.config();
                if (image.width, image.height) != (config.truth_width, config.truth_height) {
                    return Err(ConversionError::InvalidDimensions(image.width, image.height));
                }
                self.codec.pack_and_write_single(output_path, &data)
            }
            DecodedChannels::Input { r, g, b, d } => self.codec.pack_and_write_four_channel(
                output_path,
                &r,
                &g,
                &b,
                &d,
                image.width,
                image.height,
            ),
        }
    }

    fn output_dir_for(&self, folder: &Path) -> PathBuf {
        match (&self.config().output_root, folder.file_name()) {
            (Some(root), Some(name)) => root.join(name),
            (Some(root), None) => root.clone(),
            (None, _) => folder.to_path_buf(),
        }
    }

    /// Converts the folder in place, or under `output_root` when one is configured.
    pub fn convert_folder<P: AsRef<Path>>(&self, folder: P) -> Result<FolderReport> {
        let folder = folder.as_ref();
        let output_dir = self.output_dir_for(folder);
        self.convert_folder_into(folder, output_dir)
    }

    /// Converts every classified entry of `folder`, writing results to
    /// `output_dir` under the same file names. Per-file failures are recorded
    /// in the report; anything else aborts the walk.
    #[instrument(skip(self, folder, output_dir), fields(path = %folder.as_ref().display()))]
    pub fn convert_folder_into<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        folder: P,
        output_dir: Q,
    ) -> Result<FolderReport> {
        let folder = folder.as_ref();
        let output_dir = output_dir.as_ref();
        let start = Instant::now();

        if !folder.is_dir() {
            return Err(ConversionError::MissingModelFolder(folder.to_path_buf()));
        }

        let mut entries = std::fs::read_dir(folder)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        if output_dir != folder {
            std::fs::create_dir_all(output_dir).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", output_dir.display(), e))
            })?;
        }

        let total = entries.len();
        let progress_interval = self.config().progress_interval;
        let mut report = FolderReport::new(folder, total);

        for (index, entry) in entries.iter().enumerate() {
            let input_path = entry.path();
            let file_name = entry.file_name();

            match FileKind::classify(&file_name.to_string_lossy()) {
                Some(kind) if input_path.is_file() => {
                    let output_path = output_dir.join(&file_name);
                    match self.convert_file(&input_path, &output_path, kind) {
                        Ok(()) => report.record_converted(kind),
                        Err(e) if e.is_per_file() => {
                            warn!(file = %input_path.display(), "Conversion failed: {}", e);
                            report.record_failure(&input_path, &e);
                        }
                        Err(e) => return Err(e),
                    }
                }
                _ => {
                    debug!(file = %input_path.display(), "Skipping entry");
                    report.record_skipped();
                }
            }

            // Counts every entry, converted or not.
            let count = index + 1;
            if is_progress_tick(count, progress_interval) {
                let line = progress_line(count, total, folder);
                info!("{}", line);
                report.progress.push(line);
            }
        }

        report.elapsed = start.elapsed();
        report.log_summary();
        Ok(report)
    }

    /// Converts `data_root/<model>` for every model in the list. A missing
    /// model folder aborts the run.
    #[instrument(skip(self, model_list, data_root))]
    pub fn convert_models<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        model_list: P,
        data_root: Q,
    ) -> Result<BatchReport> {
        let data_root = data_root.as_ref();
        let models: Vec<String> = load_models(model_list)?
            .into_iter()
            .filter(|model| !model.trim().is_empty())
            .collect();

        info!("Models: {:?}", models);

        let mut batch = BatchReport::default();
        for model in &models {
            info!("Converting {}", model);
            let report = self.convert_folder(data_root.join(model))?;
            batch.folders.push(report);
        }

        batch.log_summary();
        Ok(batch)
    }
}
