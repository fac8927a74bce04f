use lopdf::{Dictionary, Document, Object, Stream};
use pdf_async_runtime::*;
use pdf_poster::NamingScheme;
use std::path::Path;
use std::time::Duration;

fn write_test_pdf(path: &Path, page_count: usize) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"0 0 m 600 400 l S".to_vec(),
        ));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(600),
                    Object::Integer(400),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(page_count as i64)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc.save(path).unwrap();
}

fn options_for(source: &Path, folder: &Path, name: &str) -> TiledPosterOptions {
    let mut options = TiledPosterOptions::new(source, 2, 3);
    options.output_folder = folder.to_path_buf();
    options.naming = NamingScheme::Fixed {
        file_name: name.to_string(),
    };
    options
}

/// Collect updates until one matches `done`
async fn updates_until(
    worker: &mut WorkerHandle,
    done: impl Fn(&PosterUpdate) -> bool,
) -> Vec<PosterUpdate> {
    let mut updates = Vec::new();
    loop {
        let update = tokio::time::timeout(Duration::from_secs(30), worker.next_update())
            .await
            .expect("worker timed out")
            .expect("worker stopped");
        let finished = done(&update);
        updates.push(update);
        if finished {
            return updates;
        }
    }
}

fn is_final(update: &PosterUpdate) -> bool {
    matches!(
        update,
        PosterUpdate::Generated { .. } | PosterUpdate::Cancelled | PosterUpdate::Error { .. }
    )
}

#[tokio::test]
async fn test_generate_reports_progress_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.pdf");
    write_test_pdf(&source, 2);
    let folder = dir.path().join("out");

    let mut worker = WorkerHandle::spawn();
    worker
        .send(PosterCommand::Generate {
            options: options_for(&source, &folder, "wall.pdf"),
        })
        .unwrap();

    let updates = updates_until(&mut worker, is_final).await;

    let progress: Vec<(usize, usize)> = updates
        .iter()
        .filter_map(|u| match u {
            PosterUpdate::Progress { current, total } => Some((*current, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 2), (2, 2)]);

    let states: Vec<&PosterState> = updates
        .iter()
        .filter_map(|u| match u {
            PosterUpdate::StateChanged { state } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(states.first(), Some(&&PosterState::Loading));
    assert!(states.contains(&&PosterState::Saving));
    assert!(matches!(states.last(), Some(PosterState::Done(_))));

    match updates.last() {
        Some(PosterUpdate::Generated { file }) => {
            assert_eq!(file.path, folder.join("wall.pdf"));
            assert!(file.path.is_file());
            let doc = Document::load(&file.path).unwrap();
            assert_eq!(doc.get_pages().len(), 12);
        }
        other => panic!("Expected Generated update, got {:?}", other),
    }

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_second_generate_while_busy_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.pdf");
    write_test_pdf(&source, 20);
    let folder = dir.path().join("out");

    let mut worker = WorkerHandle::spawn();
    worker
        .send(PosterCommand::Generate {
            options: options_for(&source, &folder, "first.pdf"),
        })
        .unwrap();
    worker
        .send(PosterCommand::Generate {
            options: options_for(&source, &folder, "second.pdf"),
        })
        .unwrap();

    let updates =
        updates_until(&mut worker, |u| matches!(u, PosterUpdate::Generated { .. })).await;

    assert!(updates.iter().any(|u| matches!(
        u,
        PosterUpdate::Error { message } if message.contains("already running")
    )));
    assert!(folder.join("first.pdf").is_file());
    assert!(!folder.join("second.pdf").exists());

    // Once the first run is done a new one is accepted
    worker
        .send(PosterCommand::Generate {
            options: options_for(&source, &folder, "second.pdf"),
        })
        .unwrap();
    let updates = updates_until(&mut worker, is_final).await;
    assert!(matches!(updates.last(), Some(PosterUpdate::Generated { .. })));
    assert!(folder.join("second.pdf").is_file());

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cancel_stops_generation() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.pdf");
    write_test_pdf(&source, 5);
    let folder = dir.path().join("out");

    let mut worker = WorkerHandle::spawn();
    worker
        .send(PosterCommand::Generate {
            options: options_for(&source, &folder, "wall.pdf"),
        })
        .unwrap();
    worker.send(PosterCommand::Cancel).unwrap();

    let updates = updates_until(&mut worker, is_final).await;
    assert_eq!(updates.last(), Some(&PosterUpdate::Cancelled));
    assert!(updates.iter().any(|u| matches!(
        u,
        PosterUpdate::StateChanged {
            state: PosterState::Failed(_)
        }
    )));
    assert!(!folder.join("wall.pdf").exists());

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stats_request_does_not_delay_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.pdf");
    write_test_pdf(&source, 20);
    let folder = dir.path().join("out");

    let mut worker = WorkerHandle::spawn();
    worker
        .send(PosterCommand::Generate {
            options: options_for(&source, &folder, "wall.pdf"),
        })
        .unwrap();
    worker
        .send(PosterCommand::CalculateStats {
            options: options_for(&source, &folder, "wall.pdf"),
        })
        .unwrap();
    worker.send(PosterCommand::Cancel).unwrap();

    let mut stats = None;
    let mut finished = None;
    while stats.is_none() || finished.is_none() {
        let update = tokio::time::timeout(Duration::from_secs(30), worker.next_update())
            .await
            .expect("worker timed out")
            .expect("worker stopped");
        match update {
            PosterUpdate::StatsCalculated { stats: s } => stats = Some(s),
            u if is_final(&u) => finished = Some(u),
            _ => {}
        }
    }

    assert_eq!(stats.unwrap().output_pages, 120);
    assert_eq!(finished, Some(PosterUpdate::Cancelled));
    assert!(!folder.join("wall.pdf").exists());

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_generation_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("out");

    let mut worker = WorkerHandle::spawn();
    worker
        .send(PosterCommand::Generate {
            options: options_for(&dir.path().join("missing.pdf"), &folder, "wall.pdf"),
        })
        .unwrap();

    let updates = updates_until(&mut worker, is_final).await;
    match updates.last() {
        Some(PosterUpdate::Error { message }) => assert!(message.contains("missing.pdf")),
        other => panic!("Expected Error update, got {:?}", other),
    }

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_calculate_stats() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.pdf");
    write_test_pdf(&source, 3);

    let mut worker = WorkerHandle::spawn();
    worker
        .send(PosterCommand::CalculateStats {
            options: options_for(&source, dir.path(), "unused.pdf"),
        })
        .unwrap();

    match worker.next_update().await {
        Some(PosterUpdate::StatsCalculated { stats }) => {
            assert_eq!(stats.source_pages, 3);
            assert_eq!(stats.tiles_per_page, 6);
            assert_eq!(stats.output_pages, 18);
        }
        other => panic!("Expected StatsCalculated update, got {:?}", other),
    }
    assert!(!dir.path().join("unused.pdf").exists());

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_list_generated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("gradil_1.pdf"), b"%PDF-1.7").unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"text").unwrap();

    let mut worker = WorkerHandle::spawn();
    worker
        .send(PosterCommand::ListGenerated {
            folder: dir.path().to_path_buf(),
        })
        .unwrap();
    match worker.next_update().await {
        Some(PosterUpdate::GeneratedListed { files }) => {
            assert_eq!(files, vec![GeneratedFile::new(dir.path().join("gradil_1.pdf"))]);
        }
        other => panic!("Expected GeneratedListed update, got {:?}", other),
    }

    worker
        .send(PosterCommand::ListGenerated {
            folder: dir.path().join("missing"),
        })
        .unwrap();
    assert_eq!(
        worker.next_update().await,
        Some(PosterUpdate::GeneratedListed { files: vec![] })
    );

    worker.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_worker_exits_when_commands_close() {
    let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = tokio::sync::mpsc::unbounded_channel();
    drop(command_tx);

    // The worker exits as soon as its command channel is closed
    worker_task(command_rx, update_tx).await;
    assert!(update_rx.recv().await.is_none());
}
