/*!
 * Tests for the filter graph and the encoder job built from it
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use slidecast::assembly::{EncodeDriver, FilterGraph, GraphOptions};
use slidecast::assembly::graph::{AUDIO_OUTPUT_LABEL, VIDEO_OUTPUT_LABEL};
use slidecast::providers::mock::MockEncoder;
use slidecast::providers::{CodecOptions, InputKind};

fn slide_paths(count: usize) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let images = (0..count).map(|i| PathBuf::from(format!("/in/slide{}.jpg", i))).collect();
    let audio = (0..count).map(|i| PathBuf::from(format!("/tmp/ws/audio{}.mp3", i))).collect();
    (images, audio)
}

/// Test that the text depends only on the slide count and options
#[test]
fn test_build_withDifferentPathsSameCount_shouldRenderIdenticalText() {
    let (images, audio) = slide_paths(4);
    let other_images: Vec<PathBuf> = (0..4).map(|i| PathBuf::from(format!("elsewhere/{}.png", i))).collect();
    let other_audio: Vec<PathBuf> = (0..4).map(|i| PathBuf::from(format!("x/{}.wav", i))).collect();

    let first = FilterGraph::build(&images, &audio, &GraphOptions::default()).unwrap();
    let second = FilterGraph::build(&other_images, &other_audio, &GraphOptions::default()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_build_withThreeSlides_shouldInterleaveStreamIndices() {
    let (images, audio) = slide_paths(3);
    let text = FilterGraph::build(&images, &audio, &GraphOptions::default()).unwrap().to_string();

    let chains: Vec<&str> = text.split("; ").collect();
    assert_eq!(chains.len(), 7);
    assert_eq!(chains[0], "[0:v]scale=1920:1080,setdar=16/9[v0]");
    assert_eq!(chains[1], "[1:a]anull[a0]");
    assert_eq!(chains[4], "[4:v]scale=1920:1080,setdar=16/9[v2]");
    assert_eq!(chains[5], "[5:a]anull[a2]");
    assert_eq!(chains[6], "[v0][a0][v1][a1][v2][a2]concat=n=3:v=1:a=1[v][a]");
}

#[test]
fn test_output_labels_shouldBeConcatOutputs() {
    let (images, audio) = slide_paths(1);
    let graph = FilterGraph::build(&images, &audio, &GraphOptions::default()).unwrap();
    assert_eq!(graph.output_labels(), vec![VIDEO_OUTPUT_LABEL, AUDIO_OUTPUT_LABEL]);
}

/// Test that the encoder job registers inputs image, audio, image, audio, ...
#[test]
fn test_encode_job_shouldInterleaveInputsAndCarryCodecs() {
    let (images, audio) = slide_paths(2);
    let graph = FilterGraph::build(&images, &audio, &GraphOptions::default()).unwrap();
    let driver = EncodeDriver::new(Arc::new(MockEncoder::working()), CodecOptions::default());

    let job = driver.job(&images, &audio, &graph, Path::new("/out/video.mp4"));

    assert_eq!(
        job.input_paths(),
        vec![
            Path::new("/in/slide0.jpg"),
            Path::new("/tmp/ws/audio0.mp3"),
            Path::new("/in/slide1.jpg"),
            Path::new("/tmp/ws/audio1.mp3"),
        ]
    );
    let kinds: Vec<InputKind> = job.inputs.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![InputKind::Image, InputKind::Audio, InputKind::Image, InputKind::Audio]);
    assert_eq!(job.filter_graph, graph.to_string());
    assert_eq!(job.output_mappings, vec!["[v]".to_string(), "[a]".to_string()]);
    assert_eq!(job.codec.video_codec, "libx264");
    assert_eq!(job.codec.audio_codec, "aac");
    assert_eq!(job.codec.pixel_format, "yuv420p");
    assert_eq!(job.destination, PathBuf::from("/out/video.mp4"));
}
