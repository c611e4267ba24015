use glossa_engine::model::{Analysis, RevealLayer};
use glossa_engine::navigation::Command;
use glossa_engine::session::{GenerationId, ReadingSession, SessionStatus};
use glossa_engine::stream::{
    AnalysisStream, SseDecoder, SseEvent, StreamError, Utf8Accumulator, completion_delta,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!(
        "{}/tests/fixtures/{name}",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// Feeds a raw JSON body to the session in `chunk_size` byte pieces.
fn stream_raw(
    session: &mut ReadingSession,
    id: GenerationId,
    body: &[u8],
    chunk_size: usize,
) -> Result<usize, StreamError> {
    let mut utf8 = Utf8Accumulator::new();
    let mut stream = AnalysisStream::new();
    let mut updates = 0;

    for piece in body.chunks(chunk_size) {
        if let Some(analysis) = stream.push(&utf8.push(piece))? {
            session.apply_progress(id, analysis);
            updates += 1;
        }
    }
    stream.push(&utf8.finish())?;
    let analysis = stream.finish()?;
    session.apply_progress(id, analysis);
    session.finish(id);
    Ok(updates)
}

/// Feeds a chat completion event stream to the session.
fn stream_sse(
    session: &mut ReadingSession,
    id: GenerationId,
    body: &[u8],
    chunk_size: usize,
) -> Result<Vec<Analysis>, StreamError> {
    let mut utf8 = Utf8Accumulator::new();
    let mut sse = SseDecoder::new();
    let mut stream = AnalysisStream::new();
    let mut snapshots = Vec::new();

    for piece in body.chunks(chunk_size) {
        for event in sse.push(&utf8.push(piece)) {
            match event {
                SseEvent::Data(payload) => {
                    let Some(delta) = completion_delta(&payload)? else {
                        continue;
                    };
                    if let Some(analysis) = stream.push(&delta)? {
                        snapshots.push(analysis.clone());
                        session.apply_progress(id, analysis);
                    }
                }
                SseEvent::Done => {
                    session.apply_progress(id, stream.finish()?);
                    session.finish(id);
                }
            }
        }
    }
    Ok(snapshots)
}

fn originals(session: &ReadingSession) -> Vec<String> {
    session
        .navigator()
        .tokens()
        .iter()
        .filter_map(|flat| flat.token.original.clone())
        .collect()
}

#[rstest]
fn chunk_size_does_not_change_the_result(#[values(1, 3, 16, 4096)] chunk_size: usize) {
    let mut session = ReadingSession::new();
    let id = session.begin("numbers");

    stream_raw(&mut session, id, &fixture("spanish_numbers.json"), chunk_size).unwrap();

    assert_eq!(session.status(), &SessionStatus::Complete);
    assert_eq!(session.language(), Some("spanish"));
    assert_eq!(
        originals(&session),
        vec!["Uno", "dos", "tres", "Cuatro", "cinco"]
    );
}

#[test]
fn small_chunks_produce_many_snapshots() {
    let mut session = ReadingSession::new();
    let id = session.begin("numbers");

    let updates = stream_raw(&mut session, id, &fixture("spanish_numbers.json"), 8).unwrap();

    assert!(updates > 10, "only {updates} snapshots");
}

#[rstest]
fn nulls_and_odd_indices_still_complete(#[values(1, 5, 4096)] chunk_size: usize) {
    let mut session = ReadingSession::new();
    let id = session.begin("cat");

    stream_raw(&mut session, id, &fixture("sparse_french.json"), chunk_size).unwrap();

    assert_eq!(session.status(), &SessionStatus::Complete);
    assert_eq!(originals(&session), vec!["Le", "chat", "dort"]);

    let sentence = session.analysis().analysis[0].clone().unwrap();
    let subject = sentence.syntax[0].clone().unwrap();
    assert_eq!(subject.indices, Some(vec![0, 2]));
    assert_eq!(sentence.syntax[1].clone().unwrap().index, None);
    assert!(sentence.grammatical_notes.is_empty());
}

#[test]
fn reader_walks_the_five_token_text() {
    let mut session = ReadingSession::new();
    let id = session.begin("numbers");
    stream_raw(&mut session, id, &fixture("spanish_numbers.json"), 64).unwrap();

    for _ in 0..3 {
        session.apply(Command::move_forward());
    }
    let focused = session.navigator().focused().unwrap();
    assert_eq!(focused.token.original.as_deref(), Some("Cuatro"));
    assert_eq!(focused.sentence, 1);
    assert_eq!(focused.slot, 0);

    session.apply(Command::move_forward());
    session.apply(Command::move_forward());
    assert_eq!(session.navigator().focused_index(), 4);

    // No transliteration in Spanish, so the cycle skips ahead.
    session.apply(Command::cycle_forward());
    assert_eq!(
        session.navigator().reveal_state(),
        RevealLayer::PartOfSpeech
    );
    session.apply(Command::toggle_translation());
    assert_eq!(session.navigator().reveal_state(), RevealLayer::Translation);
    session.apply(Command::toggle_translation());
    assert_eq!(session.navigator().reveal_state(), RevealLayer::Original);

    session.apply(Command::toggle_transliteration());
    assert_eq!(session.navigator().reveal_state(), RevealLayer::Original);

    session.apply(Command::move_backward());
    assert_eq!(session.navigator().focused_index(), 3);
}

#[rstest]
fn event_stream_with_split_characters(#[values(1, 7, 100)] chunk_size: usize) {
    let mut session = ReadingSession::new();
    let id = session.begin("coffee");

    let snapshots = stream_sse(&mut session, id, &fixture("arabic_coffee.sse"), chunk_size).unwrap();

    assert!(!snapshots.is_empty());
    assert_eq!(session.status(), &SessionStatus::Complete);
    assert!(session.navigator().is_rtl());
    assert_eq!(session.language(), Some("arabic"));
    assert_eq!(originals(&session), vec!["أنا", "أحب", "القهوة"]);

    let sentence = session.analysis().sentences()[0].as_ref().unwrap();
    assert_eq!(sentence.translation.as_deref(), Some("I love coffee."));
    assert_eq!(sentence.syntax.len(), 2);
}

#[test]
fn right_to_left_text_mirrors_arrow_keys() {
    let mut session = ReadingSession::new();
    let id = session.begin("coffee");
    stream_sse(&mut session, id, &fixture("arabic_coffee.sse"), 512).unwrap();

    // Visually rightward is backwards through an Arabic sentence.
    session.apply(Command::move_forward());
    assert_eq!(session.navigator().focused_index(), 0);

    session.apply(Command::move_backward());
    session.apply(Command::move_backward());
    assert_eq!(session.navigator().focused_index(), 2);

    session.apply(Command::cycle_forward());
    assert_eq!(
        session.navigator().reveal_state(),
        RevealLayer::Transliteration
    );
    let focused = session.navigator().focused().unwrap();
    assert_eq!(
        focused.token.layer(RevealLayer::Transliteration),
        Some("al-qahwa")
    );
}

#[test]
fn stale_generation_cannot_touch_the_new_text() {
    let body = fixture("spanish_numbers.json");
    let mut session = ReadingSession::new();

    let first = session.begin("numbers");
    let mut old_stream = AnalysisStream::new();
    let snapshot = old_stream
        .push(std::str::from_utf8(&body[..200]).unwrap())
        .unwrap()
        .unwrap();
    session.apply_progress(first, snapshot);
    assert!(!session.navigator().is_empty());

    let second = session.begin("coffee");
    assert!(session.navigator().is_empty());

    // The cancelled request keeps delivering.
    let rest = String::from_utf8_lossy(&body[200..]).into_owned();
    if let Ok(Some(late)) = old_stream.push(&rest) {
        assert!(!session.apply_progress(first, late));
    }
    assert!(!session.finish(first));
    assert!(session.navigator().is_empty());

    stream_sse(&mut session, second, &fixture("arabic_coffee.sse"), 64).unwrap();
    assert_eq!(originals(&session), vec!["أنا", "أحب", "القهوة"]);
}

#[test]
fn truncated_response_fails_but_stays_readable() {
    let text = String::from_utf8(fixture("arabic_coffee.sse")).unwrap();
    let mut sse = SseDecoder::new();
    let mut json = String::new();
    for event in sse.push(&text) {
        if let SseEvent::Data(payload) = event
            && let Some(delta) = completion_delta(&payload).unwrap()
        {
            json.push_str(&delta);
        }
    }
    let cut = json.find(r#"{"original": "القهوة""#).unwrap();

    let mut session = ReadingSession::new();
    let id = session.begin("coffee");
    let mut stream = AnalysisStream::new();
    if let Some(analysis) = stream.push(&json[..cut]).unwrap() {
        session.apply_progress(id, analysis);
    }

    let err = stream.finish().unwrap_err();
    assert!(matches!(err, StreamError::Incomplete));
    session.fail(id, err.to_string());

    assert!(matches!(session.status(), SessionStatus::Failed(_)));
    assert_eq!(originals(&session), vec!["أنا", "أحب"]);
}
