use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::image_pipeline::channels::{DecodedChannels, DecodedLayer, RgbaPlanes};
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::conversions::{ChannelCodec, FileKind, FolderConverter};
use crate::image_pipeline::exr_io::{ChannelReader, ConversionConfig, ExrWriter};

const TRUTH: [f32; 4] = [1.0, 2.0, 3.0, 4.0];
const DEPTH: [f32; 4] = [9.0, 8.0, 7.0, 6.0];

/// Decodes the fake file bodies written by `write_fake`.
struct MockReader;

impl ChannelReader for MockReader {
    fn read_channels(&self, data: &[u8]) -> Result<DecodedLayer> {
        let channels = match data {
            b"truth" => vec![("Y".to_string(), TRUTH.to_vec())],
            b"truth-rgba" => vec![
                ("A".to_string(), vec![1.0; 4]),
                ("B".to_string(), TRUTH.to_vec()),
                ("G".to_string(), TRUTH.to_vec()),
                ("R".to_string(), TRUTH.to_vec()),
            ],
            b"input" => vec![
                ("B".to_string(), vec![0.3; 4]),
                ("D".to_string(), DEPTH.to_vec()),
                ("G".to_string(), vec![0.2; 4]),
                ("R".to_string(), vec![0.1; 4]),
            ],
            b"input-converted" => vec![
                ("A".to_string(), DEPTH.to_vec()),
                ("B".to_string(), vec![0.3; 4]),
                ("G".to_string(), vec![0.2; 4]),
                ("R".to_string(), vec![0.1; 4]),
            ],
            b"input-short" => vec![
                ("B".to_string(), vec![0.3; 4]),
                ("D".to_string(), vec![1.0; 3]),
                ("G".to_string(), vec![0.2; 4]),
                ("R".to_string(), vec![0.1; 4]),
            ],
            b"no-depth" => vec![
                ("B".to_string(), vec![0.3; 4]),
                ("G".to_string(), vec![0.2; 4]),
                ("R".to_string(), vec![0.1; 4]),
            ],
            _ => return Err(ConversionError::InputReadError("Mock decode error".to_string())),
        };
        Ok(DecodedLayer {
            width: 2,
            height: 2,
            channels,
        })
    }
}

struct MockWriter {
    should_fail: bool,
    written_data: Arc<Mutex<Vec<RgbaPlanes>>>,
}

impl ExrWriter for MockWriter {
    fn write_exr(&self, image: &RgbaPlanes, output: &mut dyn Write, _config: &ConversionConfig) -> Result<()> {
        if self.should_fail {
            return Err(ConversionError::EncodeError("Mock encode error".to_string()));
        }
        output.write_all(b"exr")?;
        self.written_data.lock().unwrap().push(image.clone());
        Ok(())
    }
}

fn test_config() -> ConversionConfig {
    ConversionConfig::builder()
        .truth_dimensions(2, 2)
        .progress_interval(2)
        .build()
}

fn mock_codec(config: ConversionConfig) -> (ChannelCodec<MockReader, MockWriter>, Arc<Mutex<Vec<RgbaPlanes>>>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        should_fail: false,
        written_data: written.clone(),
    };
    (ChannelCodec::with_custom(MockReader, writer, config), written)
}

fn write_fake(dir: &Path, name: &str, body: &[u8]) {
    std::fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_config_builder() {
    let config = ConversionConfig::builder()
        .truth_dimensions(640, 480)
        .truth_channel("Y")
        .depth_channels(["Z"])
        .validate_dimensions(false)
        .progress_interval(0)
        .build();

    assert_eq!((config.truth_width, config.truth_height), (640, 480));
    assert_eq!(config.truth_channel, "Y");
    assert_eq!(config.depth_channels, vec!["Z".to_string()]);
    assert!(!config.validate_dimensions);
    assert_eq!(config.progress_interval, 0);
    assert!(config.output_root.is_none());
}

#[test]
fn test_pack_and_write_single() {
    let dir = tempfile::tempdir().unwrap();
    let (codec, written) = mock_codec(test_config());

    codec.pack_and_write_single(dir.path().join("out.exr"), &TRUTH).unwrap();

    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].r, TRUTH);
    assert_eq!(written[0].g, TRUTH);
    assert_eq!(written[0].b, TRUTH);
    assert_eq!(written[0].a, vec![1.0; 4]);
    assert_eq!(std::fs::read(dir.path().join("out.exr")).unwrap(), b"exr");
}

#[test]
fn test_pack_and_write_single_shape_mismatch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (codec, written) = mock_codec(test_config());
    let output = dir.path().join("out.exr");

    let result = codec.pack_and_write_single(&output, &TRUTH[..3]);

    assert!(matches!(
        result,
        Err(ConversionError::ShapeMismatch { expected: 4, actual: 3 })
    ));
    assert!(written.lock().unwrap().is_empty());
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_pack_and_write_shaped_uses_grid_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let (codec, written) = mock_codec(test_config());
    let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];

    codec.pack_and_write_shaped(dir.path().join("out.exr"), &rows).unwrap();

    let written = written.lock().unwrap();
    assert_eq!((written[0].width, written[0].height), (3, 2));
    assert_eq!(written[0].g, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_pack_and_write_four_channel_keeps_depth_in_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let (codec, written) = mock_codec(test_config());
    let r = [0.1; 4];
    let g = [0.2; 4];
    let b = [0.3; 4];

    codec
        .pack_and_write_four_channel(dir.path().join("out.exr"), &r, &g, &b, &DEPTH, 2, 2)
        .unwrap();

    let written = written.lock().unwrap();
    assert_eq!(written[0].r, r);
    assert_eq!(written[0].g, g);
    assert_eq!(written[0].b, b);
    assert_eq!(written[0].a, DEPTH);
}

#[test]
fn test_zero_dimensions_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (codec, _written) = mock_codec(test_config());
    let rows: Vec<Vec<f32>> = Vec::new();

    let result = codec.pack_and_write_shaped(dir.path().join("out.exr"), &rows);
    assert!(matches!(result, Err(ConversionError::InvalidDimensions(0, 0))));
}

#[test]
fn test_writer_failure_leaves_destination_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.exr");
    std::fs::write(&output, b"original").unwrap();

    let writer = MockWriter {
        should_fail: true,
        written_data: Arc::new(Mutex::new(Vec::new())),
    };
    let codec = ChannelCodec::with_custom(MockReader, writer, test_config());

    let result = codec.pack_and_write_single(&output, &TRUTH);

    assert!(matches!(result, Err(ConversionError::EncodeError(_))));
    assert_eq!(std::fs::read(&output).unwrap(), b"original");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_decode_read_truth_falls_back_to_only_channel() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "t_groundtruth.exr", b"truth");
    let (codec, _written) = mock_codec(test_config());

    let image = codec
        .decode_read(dir.path().join("t_groundtruth.exr"), FileKind::Truth)
        .unwrap();

    assert_eq!(image.channels, DecodedChannels::Truth(TRUTH.to_vec()));
}

#[test]
fn test_decode_read_truth_prefers_configured_channel() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "t_groundtruth.exr", b"truth-rgba");
    let (codec, _written) = mock_codec(test_config());

    let image = codec
        .decode_read(dir.path().join("t_groundtruth.exr"), FileKind::Truth)
        .unwrap();

    assert_eq!(image.channels, DecodedChannels::Truth(TRUTH.to_vec()));
}

#[test]
fn test_decode_read_truth_missing_channel() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "t_groundtruth.exr", b"truth-rgba");
    let config = ConversionConfig::builder().truth_channel("Y").build();
    let (codec, _written) = mock_codec(config);

    let result = codec.decode_read(dir.path().join("t_groundtruth.exr"), FileKind::Truth);

    assert!(matches!(
        result,
        Err(ConversionError::MissingChannel { ref channel, .. }) if channel == "Y"
    ));
}

#[test]
fn test_decode_read_input_depth_candidates() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "raw_input.exr", b"input");
    write_fake(dir.path(), "converted_input.exr", b"input-converted");
    let (codec, _written) = mock_codec(test_config());

    for name in ["raw_input.exr", "converted_input.exr"] {
        let image = codec.decode_read(dir.path().join(name), FileKind::Input).unwrap();
        match image.channels {
            DecodedChannels::Input { r, g, b, d } => {
                assert_eq!(r, vec![0.1; 4]);
                assert_eq!(g, vec![0.2; 4]);
                assert_eq!(b, vec![0.3; 4]);
                assert_eq!(d, DEPTH);
            }
            other => panic!("expected input channels, got {:?}", other),
        }
    }
}

#[test]
fn test_decode_read_input_without_depth() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "x_input.exr", b"no-depth");
    let (codec, _written) = mock_codec(test_config());

    let result = codec.decode_read(dir.path().join("x_input.exr"), FileKind::Input);
    assert!(matches!(result, Err(ConversionError::MissingChannel { .. })));
}

#[test]
fn test_decode_read_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "bad_input.exr", b"garbage");
    let (codec, _written) = mock_codec(test_config());

    let missing = codec.decode_read(dir.path().join("nope_input.exr"), FileKind::Input);
    let garbage = codec.decode_read(dir.path().join("bad_input.exr"), FileKind::Input);

    assert!(matches!(missing, Err(ConversionError::UnreadableFile { .. })));
    assert!(matches!(garbage, Err(ConversionError::UnreadableFile { .. })));
}

#[test]
fn test_convert_folder_routes_by_name() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "0001_groundtruth.exr", b"truth");
    write_fake(dir.path(), "0001_input.exr", b"input");
    write_fake(dir.path(), "readme.txt", b"input");
    std::fs::create_dir(dir.path().join("input_cache")).unwrap();

    let (codec, written) = mock_codec(test_config());
    let converter = FolderConverter::with_codec(codec);

    let report = converter.convert_folder(dir.path()).unwrap();

    assert_eq!(report.entries, 4);
    assert_eq!(report.converted_truth, 1);
    assert_eq!(report.converted_input, 1);
    assert_eq!(report.skipped, 2);
    assert!(report.failures.is_empty());

    // Sorted by name: groundtruth before input.
    let written = written.lock().unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].a, vec![1.0; 4]);
    assert_eq!(written[0].r, TRUTH);
    assert_eq!(written[1].a, DEPTH);
    assert_eq!(written[1].r, vec![0.1; 4]);

    assert_eq!(std::fs::read(dir.path().join("0001_input.exr")).unwrap(), b"exr");
    assert_eq!(std::fs::read(dir.path().join("readme.txt")).unwrap(), b"input");
}

#[test]
fn test_convert_folder_continues_after_bad_file() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "a_input.exr", b"garbage");
    write_fake(dir.path(), "b_input.exr", b"input-short");
    write_fake(dir.path(), "c_groundtruth.exr", b"truth");

    let (codec, written) = mock_codec(test_config());
    let converter = FolderConverter::with_codec(codec);

    let report = converter.convert_folder(dir.path()).unwrap();

    assert_eq!(report.converted(), 1);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].path.ends_with("a_input.exr"));
    assert!(report.failures[1].error.contains("Shape mismatch"));
    assert_eq!(written.lock().unwrap().len(), 1);
    assert_eq!(std::fs::read(dir.path().join("a_input.exr")).unwrap(), b"garbage");
}

#[test]
fn test_convert_folder_missing() {
    let dir = tempfile::tempdir().unwrap();
    let (codec, _written) = mock_codec(test_config());
    let converter = FolderConverter::with_codec(codec);

    let result = converter.convert_folder(dir.path().join("missing"));
    assert!(matches!(result, Err(ConversionError::MissingModelFolder(_))));
}

#[test]
fn test_convert_folder_with_output_root() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let folder = data.path().join("sponza");
    std::fs::create_dir(&folder).unwrap();
    write_fake(&folder, "0001_groundtruth.exr", b"truth");

    let config = ConversionConfig::builder()
        .truth_dimensions(2, 2)
        .output_root(Some(out.path().to_path_buf()))
        .build();
    let (codec, _written) = mock_codec(config);
    let converter = FolderConverter::with_codec(codec);

    converter.convert_folder(&folder).unwrap();

    assert_eq!(std::fs::read(folder.join("0001_groundtruth.exr")).unwrap(), b"truth");
    assert_eq!(
        std::fs::read(out.path().join("sponza").join("0001_groundtruth.exr")).unwrap(),
        b"exr"
    );
}

#[test]
fn test_convert_models() {
    let data = tempfile::tempdir().unwrap();
    for model in ["sponza", "bistro"] {
        let folder = data.path().join(model);
        std::fs::create_dir(&folder).unwrap();
        write_fake(&folder, "0001_groundtruth.exr", b"truth");
        write_fake(&folder, "0001_input.exr", b"input");
    }
    let list = data.path().join("models.txt");
    std::fs::write(&list, "sponza\n\nbistro\n").unwrap();

    let (codec, written) = mock_codec(test_config());
    let converter = FolderConverter::with_codec(codec);

    let batch = converter.convert_models(&list, data.path()).unwrap();

    assert_eq!(batch.folders.len(), 2);
    assert_eq!(batch.total_converted(), 4);
    assert_eq!(batch.total_failures(), 0);
    assert_eq!(written.lock().unwrap().len(), 4);
}

#[test]
fn test_convert_models_aborts_on_missing_folder() {
    let data = tempfile::tempdir().unwrap();
    let folder = data.path().join("sponza");
    std::fs::create_dir(&folder).unwrap();
    write_fake(&folder, "0001_groundtruth.exr", b"truth");
    let list = data.path().join("models.txt");
    std::fs::write(&list, "ghost\nsponza\n").unwrap();

    let (codec, written) = mock_codec(test_config());
    let converter = FolderConverter::with_codec(codec);

    let result = converter.convert_models(&list, data.path());

    assert!(matches!(result, Err(ConversionError::MissingModelFolder(_))));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_convert_folder_progress_counts_skipped_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "0001_groundtruth.exr", b"truth");
    write_fake(dir.path(), "a.txt", b"");
    write_fake(dir.path(), "b.txt", b"");
    write_fake(dir.path(), "c.txt", b"");

    let (codec, _written) = mock_codec(test_config());
    let converter = FolderConverter::with_codec(codec);

    let report = converter.convert_folder(dir.path()).unwrap();

    assert_eq!(report.converted(), 1);
    assert_eq!(report.skipped, 3);
    let folder = dir.path().display();
    assert_eq!(
        report.progress,
        vec![
            format!("Done with Image 2 from 4 in folder: {}", folder),
            format!("Done with Image 4 from 4 in folder: {}", folder),
        ]
    );
}

#[test]
fn test_convert_folder_progress_disabled() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "a.txt", b"");
    write_fake(dir.path(), "b.txt", b"");

    let config = ConversionConfig::builder().progress_interval(0).build();
    let (codec, _written) = mock_codec(config);
    let converter = FolderConverter::with_codec(codec);

    let report = converter.convert_folder(dir.path()).unwrap();
    assert!(report.progress.is_empty());
}

#[test]
fn test_convert_file_rejects_truth_geometry_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write_fake(dir.path(), "0001_groundtruth.exr", b"truth");

    // The mock decodes 2x2; 4x1 has the same sample count.
    let config = ConversionConfig::builder().truth_dimensions(4, 1).build();
    let (codec, written) = mock_codec(config);
    let converter = FolderConverter::with_codec(codec);

    let path = dir.path().join("0001_groundtruth.exr");
    let result = converter.convert_file(&path, &path, FileKind::Truth);

    assert!(matches!(result, Err(ConversionError::InvalidDimensions(2, 2))));
    assert!(written.lock().unwrap().is_empty());
    assert_eq!(std::fs::read(&path).unwrap(), b"truth");
}

#[cfg(unix)]
#[test]
fn test_replaced_file_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.exr");
    std::fs::write(&output, b"original").unwrap();
    std::fs::set_permissions(&output, std::fs::Permissions::from_mode(0o644)).unwrap();

    let (codec, _written) = mock_codec(test_config());
    codec.pack_and_write_single(&output, &TRUTH).unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), b"exr");
    let mode = std::fs::metadata(&output).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
