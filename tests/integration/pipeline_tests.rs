/*!
 * End-to-end assembly tests with mock providers
 */

use anyhow::Result;
use std::path::Path;
use slidecast::errors::AssemblyError;
use slidecast::providers::mock::{MockEncoder, MockSynthesizer};
use slidecast::providers::InputKind;
use crate::common;

/// Test the happy path with two slides
#[tokio::test]
async fn test_create_video_withTwoSlides_shouldEncodeInterleavedInputs() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg", "b.jpg"])?;
    let output = temp_dir.path().join("out").join("video.mp4");

    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let result = assembler
        .create_video(images.clone(), common::captions(&["Bonjour", "Au revoir"]), &output)
        .await?;

    assert_eq!(result, output);
    assert!(output.exists());
    assert_eq!(synthesizer.call_count(), 2);

    let jobs = encoder.jobs();
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];

    let names: Vec<String> = job
        .input_paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.jpg", "audio0.mp3", "b.jpg", "audio1.mp3"]);
    assert_eq!(job.inputs[0].path, images[0]);
    assert_eq!(job.inputs[2].path, images[1]);
    assert_eq!(job.inputs[1].kind, InputKind::Audio);
    assert!(job.filter_graph.ends_with("[v0][a0][v1][a1]concat=n=2:v=1:a=1[v][a]"));
    assert_eq!(job.output_mappings, vec!["[v]", "[a]"]);

    // Audio lived in one request directory which is now gone
    let audio_dir = job.inputs[1].path.parent().unwrap().to_path_buf();
    assert_eq!(job.inputs[3].path.parent().unwrap(), audio_dir);
    assert!(!audio_dir.exists());
    assert!(common::list_dir(&temp_root).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_create_video_withSingleSlide_shouldUseOneSegmentConcat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let images = common::create_test_images(temp_dir.path(), &["only.png"])?;
    let output = temp_dir.path().join("single.mp4");

    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    assembler
        .create_video(images, common::captions(&["Seul"]), &output)
        .await?;

    let job = &encoder.jobs()[0];
    assert_eq!(job.inputs.len(), 2);
    assert_eq!(
        job.filter_graph,
        "[0:v]scale=1920:1080,setdar=16/9[v0]; [1:a]anull[a0]; [v0][a0]concat=n=1:v=1:a=1[v][a]"
    );
    Ok(())
}

/// Test that a count mismatch fails before any side effect
#[tokio::test]
async fn test_create_video_withCountMismatch_shouldFailWithoutSideEffects() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg", "b.jpg"])?;
    let output = temp_dir.path().join("out").join("video.mp4");

    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let error = assembler
        .create_video(images, common::captions(&["only one"]), &output)
        .await
        .unwrap_err();

    assert!(matches!(error, AssemblyError::Validation(_)));
    assert_eq!(synthesizer.call_count(), 0);
    assert!(encoder.jobs().is_empty());
    assert!(!temp_root.exists());
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_create_video_withNoImages_shouldFailValidation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, temp_dir.path(), None);

    let error = assembler
        .create_video(Vec::new(), Vec::new(), &temp_dir.path().join("video.mp4"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), "validation");
    assert_eq!(synthesizer.call_count(), 0);
    Ok(())
}

/// Test that one failing caption fails the request and cleans up
#[tokio::test]
async fn test_create_video_withFailingCaption_shouldReportSynthesisAndCleanUp() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg", "b.jpg", "c.jpg"])?;
    let output = temp_dir.path().join("video.mp4");

    let synthesizer = MockSynthesizer::failing_on(["deux"]).with_random_delay(10);
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let error = assembler
        .create_video(images, common::captions(&["un", "deux", "trois"]), &output)
        .await
        .unwrap_err();

    match error {
        AssemblyError::Synthesis { index, .. } => assert_eq!(index, 1),
        other => panic!("expected synthesis error, got {:?}", other),
    }
    assert!(encoder.jobs().is_empty());
    assert!(!output.exists());
    assert!(common::list_dir(&temp_root).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_create_video_withSynthesizerWritingNothing_shouldReportSynthesis() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg"])?;

    let synthesizer = MockSynthesizer::without_files();
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let error = assembler
        .create_video(images, common::captions(&["silence"]), &temp_dir.path().join("v.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(error, AssemblyError::Synthesis { index: 0, .. }));
    assert!(encoder.jobs().is_empty());
    assert!(common::list_dir(&temp_root).is_empty());
    Ok(())
}

/// Test that an encoder failure leaves neither partial output nor temp files
#[tokio::test]
async fn test_create_video_withEncoderFailure_shouldRemovePartialOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg", "b.jpg"])?;
    let output = temp_dir.path().join("video.mp4");

    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::failing_with_partial_output("Conversion failed!");
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let error = assembler
        .create_video(images, common::captions(&["a", "b"]), &output)
        .await
        .unwrap_err();

    assert!(matches!(error, AssemblyError::Encode(_)));
    assert!(error.to_string().contains("Conversion failed!"));
    assert_eq!(encoder.jobs().len(), 1);
    assert!(!output.exists());
    assert!(!encoder.jobs()[0].destination.exists());
    assert!(common::list_dir(&temp_root).is_empty());
    Ok(())
}

/// Test that a failed run never touches a file already at the output path
#[tokio::test]
async fn test_create_video_withEncoderFailure_shouldKeepPreexistingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let out_dir = temp_dir.path().join("out");
    std::fs::create_dir_all(&out_dir)?;
    let images = common::create_test_images(temp_dir.path(), &["a.jpg"])?;
    let output = common::create_test_file(&out_dir, "talk.mp4", "earlier video")?;

    for encoder in [MockEncoder::failing("spawn failed"), MockEncoder::failing_with_partial_output("muxer died")] {
        let synthesizer = MockSynthesizer::working();
        let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

        let error = assembler
            .create_video(images.clone(), common::captions(&["a"]), &output)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "encode");
        assert_eq!(std::fs::read_to_string(&output)?, "earlier video");
        assert_eq!(common::list_dir(&out_dir), vec![output.clone()]);
    }
    Ok(())
}

/// Test that a successful run replaces an earlier file and leaves no staging file
#[tokio::test]
async fn test_create_video_withPreexistingOutput_shouldReplaceItOnSuccess() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let out_dir = temp_dir.path().join("out");
    std::fs::create_dir_all(&out_dir)?;
    let images = common::create_test_images(temp_dir.path(), &["a.jpg"])?;
    let output = common::create_test_file(&out_dir, "talk.mp4", "earlier video")?;

    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let result = assembler.create_video(images, common::captions(&["a"]), &output).await?;

    assert_eq!(result, output);
    assert_eq!(std::fs::read_to_string(&output)?, "MOCK-VIDEO");
    assert_eq!(common::list_dir(&out_dir), vec![output.clone()]);

    // The encoder wrote beside the destination, keeping the container extension
    let staged = &encoder.jobs()[0].destination;
    assert_eq!(staged.parent(), Some(out_dir.as_path()));
    assert_eq!(staged.extension().and_then(|e| e.to_str()), Some("mp4"));
    assert_ne!(staged, &output);
    Ok(())
}

#[tokio::test]
async fn test_create_video_withEncoderReportingPhantomOutput_shouldFailEncode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg"])?;

    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::without_output();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let error = assembler
        .create_video(images, common::captions(&["a"]), &temp_dir.path().join("v.mp4"))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), "encode");
    assert!(common::list_dir(&temp_root).is_empty());
    Ok(())
}

/// Test that repeated identical requests yield distinct outputs and no residue
#[tokio::test]
async fn test_create_video_calledTwice_shouldProduceTwoOutputsAndNoResidue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let output_dir = temp_dir.path().join("output");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg", "b.jpg"])?;
    let texts = common::captions(&["Bonjour", "Salut"]);

    let synthesizer = MockSynthesizer::working();
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let first_path = slidecast::file_utils::FileManager::generate_output_path(&output_dir);
    let second_path = slidecast::file_utils::FileManager::generate_output_path(&output_dir);
    let first = assembler.create_video(images.clone(), texts.clone(), &first_path).await?;
    let second = assembler.create_video(images, texts, &second_path).await?;

    assert_ne!(first, second);
    assert!(first.exists() && second.exists());
    assert_eq!(common::list_dir(&output_dir).len(), 2);
    assert!(common::list_dir(&temp_root).is_empty());

    let jobs = encoder.jobs();
    assert_eq!(jobs[0].filter_graph, jobs[1].filter_graph);
    assert_ne!(jobs[0].inputs[1].path, jobs[1].inputs[1].path);
    Ok(())
}

/// Test that concurrent requests do not share workspaces
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_create_video_concurrentRequests_shouldUseDisjointWorkspaces() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let temp_root = temp_dir.path().join("tmp");
    let output_dir = temp_dir.path().join("output");
    let images = common::create_test_images(temp_dir.path(), &["a.jpg", "b.jpg", "c.jpg"])?;

    let synthesizer = MockSynthesizer::working().with_random_delay(15);
    let encoder = MockEncoder::working();
    let assembler = common::mock_assembler(&synthesizer, &encoder, &temp_root, None);

    let requests = (0..4).map(|n| {
        let assembler = assembler.clone();
        let images = images.clone();
        let output = output_dir.join(format!("video{}.mp4", n));
        let texts = common::captions(&["one", "two", "three"]);
        tokio::spawn(async move { assembler.create_video(images, texts, &output).await })
    });

    for handle in futures::future::join_all(requests).await {
        handle??;
    }

    let audio_dirs: std::collections::HashSet<_> = encoder
        .jobs()
        .iter()
        .map(|job| job.inputs[1].path.parent().unwrap().to_path_buf())
        .collect();
    assert_eq!(audio_dirs.len(), 4);
    assert_eq!(common::list_dir(&output_dir).len(), 4);
    assert!(common::list_dir(&temp_root).is_empty());
    assert!(!Path::new(&temp_root).join("audio0.mp3").exists());
    Ok(())
}
