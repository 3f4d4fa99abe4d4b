//! Integration tests for the queue board
//!
//! Drive the board the way a UI does (add, list, activate, edit, delete) and
//! check what the player ends up holding.

mod test_helpers;

use queueboard_playback::{
    BoardConfig, BoardEvent, MemoryPlayer, Player, QueueBoard, QueueError, QueueRef,
};
use std::sync::Arc;
use test_helpers::{eventually, ids, new_board, tracks};

#[tokio::test]
async fn party_queue_end_to_end() {
    let board = new_board();
    let id = board
        .add("Party", tracks(&["s1", "s2", "s3"]), true, false)
        .unwrap();

    let all = board.get_all_queues();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Party");
    assert_eq!(all[0].item_count, 3);
    assert_eq!(all[0].duration_secs, 600);
    assert!(!all[0].active);

    let player = Arc::new(MemoryPlayer::new());
    let active = board
        .set_curr_queue(Some("Party".into()), player.clone())
        .unwrap();

    assert_eq!(active, id);
    assert_eq!(ids(&player.items()), ["s1", "s2", "s3"]);
    assert_eq!(player.current_index(), Some(0));
    assert_eq!(board.get_queue(&id).unwrap().cursor, Some(0));
    assert!(board.get_all_queues()[0].active);
}

#[tokio::test]
async fn delta_merge_and_force_insert() {
    let board = new_board();
    let id = board.add("Mix", tracks(&["a", "b"]), false, false).unwrap();

    board.add("Mix", tracks(&["b", "c"]), false, true).unwrap();
    assert_eq!(ids(&board.get_queue(&id).unwrap().canonical), ["a", "b", "c"]);

    board.add("Mix", tracks(&["a"]), true, true).unwrap();
    assert_eq!(
        ids(&board.get_queue(&id).unwrap().canonical),
        ["a", "b", "c", "a"]
    );

    board.add("Mix", tracks(&["z"]), false, false).unwrap();
    assert_eq!(ids(&board.get_queue(&id).unwrap().canonical), ["z"]);
}

#[tokio::test]
async fn reactivation_preserves_position() {
    let board = new_board();
    let a = board.add("A", tracks(&["a1", "a2", "a3"]), false, false).unwrap();
    board.add("B", tracks(&["b1", "b2"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());

    board.set_curr_queue(Some("A".into()), player.clone()).unwrap();
    assert!(player.advance_to(2));
    assert!(eventually(|| board.get_queue(&a).unwrap().cursor == Some(2)).await);

    board.set_curr_queue(Some("B".into()), player.clone()).unwrap();
    assert_eq!(ids(&player.items()), ["b1", "b2"]);
    assert_eq!(player.current_index(), Some(0));

    board.set_curr_queue(Some("A".into()), player.clone()).unwrap();
    assert_eq!(player.current_index(), Some(2));
    assert_eq!(player.current_track().unwrap().id().as_str(), "a3");
}

#[tokio::test]
async fn activation_continues_playing_track() {
    let board = new_board();
    board.add("A", tracks(&["x", "y", "z"]), false, false).unwrap();
    let b = board.add("B", tracks(&["w", "y"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());

    board.set_curr_queue(Some("A".into()), player.clone()).unwrap();
    assert!(player.seek_to(1));
    assert!(eventually(|| board.to_record().queues[0].cursor == Some(1)).await);

    board.set_curr_queue(Some("B".into()), player.clone()).unwrap();

    assert_eq!(player.current_index(), Some(1));
    assert_eq!(board.get_queue(&b).unwrap().cursor, Some(1));
}

#[tokio::test]
async fn continuity_can_be_disabled() {
    let mut config = BoardConfig::default();
    config.binding.prefer_playing_track = false;
    let board = Arc::new(QueueBoard::new(config));
    board.add("A", tracks(&["x", "y"]), false, false).unwrap();
    board.add("B", tracks(&["w", "y"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());

    board.set_curr_queue(Some("A".into()), player.clone()).unwrap();
    board.on_player_seek(1).unwrap();
    board.set_curr_queue(Some("B".into()), player.clone()).unwrap();

    assert_eq!(player.current_index(), Some(0));
}

#[tokio::test]
async fn most_recent_queue_is_default_target() {
    let board = new_board();
    board.add("Old", tracks(&["a"]), false, false).unwrap();
    let recent = board.add("New", tracks(&["b"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());

    let active = board.set_curr_queue(None, player.clone()).unwrap();

    assert_eq!(active, recent);
    assert_eq!(ids(&player.items()), ["b"]);
}

#[tokio::test]
async fn activation_by_id() {
    let board = new_board();
    let first = board.add("A", tracks(&["a"]), false, false).unwrap();
    board.add("B", tracks(&["b"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());

    let active = board
        .set_curr_queue(Some(QueueRef::Id(first.clone())), player.clone())
        .unwrap();

    assert_eq!(active, first);
    assert_eq!(board.current_queue_id(), Some(first));
}

#[tokio::test]
async fn empty_board_has_no_queues_to_activate() {
    let board = new_board();
    let player = Arc::new(MemoryPlayer::new());

    let err = board.set_curr_queue(None, player.clone()).unwrap_err();

    assert!(matches!(err, QueueError::NoQueuesAvailable));
    assert_eq!(player.load_count(), 0);
}

#[tokio::test]
async fn unknown_title_leaves_active_queue() {
    let board = new_board();
    let a = board.add("A", tracks(&["a"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(None, player.clone()).unwrap();

    let err = board
        .set_curr_queue(Some("Nope".into()), player.clone())
        .unwrap_err();

    assert!(matches!(err, QueueError::NotFound(_)));
    assert_eq!(board.current_queue_id(), Some(a));
}

#[tokio::test]
async fn unavailable_player_leaves_active_queue() {
    let board = new_board();
    let a = board.add("A", tracks(&["a1", "a2"]), false, false).unwrap();
    let b = board.add("B", tracks(&["b1"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(Some("A".into()), player.clone()).unwrap();

    let gone = Arc::new(MemoryPlayer::new());
    gone.release();
    let err = board
        .set_curr_queue(Some(QueueRef::Id(b.clone())), gone)
        .unwrap_err();

    assert!(matches!(err, QueueError::PlayerUnavailable(_)));
    assert_eq!(board.current_queue_id(), Some(a));
    assert_eq!(ids(&player.items()), ["a1", "a2"]);
    assert_eq!(board.get_queue(&b).unwrap().cursor, None);
}

#[tokio::test]
async fn switching_players_stops_the_old_one() {
    let board = new_board();
    board.add("A", tracks(&["a1", "a2"]), false, false).unwrap();
    let first = Arc::new(MemoryPlayer::new());
    let second = Arc::new(MemoryPlayer::new());

    board.set_curr_queue(Some("A".into()), first.clone()).unwrap();
    board.on_player_advance(1).unwrap();
    board.set_curr_queue(Some("A".into()), second.clone()).unwrap();

    assert!(first.is_stopped());
    assert_eq!(ids(&second.items()), ["a1", "a2"]);
    assert_eq!(second.current_index(), Some(1));
}

#[tokio::test]
async fn reactivating_active_queue_is_a_no_op() {
    let board = new_board();
    board.add("A", tracks(&["a1", "a2"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());

    board.set_curr_queue(None, player.clone()).unwrap();
    board.set_curr_queue(None, player.clone()).unwrap();

    assert_eq!(player.load_count(), 1);
}

#[tokio::test]
async fn removing_active_queue_stops_player() {
    let board = new_board();
    let a = board.add("A", tracks(&["a1", "a2"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(None, player.clone()).unwrap();
    let mut events = board.subscribe();

    board.remove_queue(&a).unwrap();

    assert!(player.is_stopped());
    assert_eq!(board.current_queue_id(), None);
    assert!(board.is_empty());
    assert!(matches!(
        board.get_queue(&a),
        Err(QueueError::NotFound(_))
    ));
    assert_eq!(
        events.recv().await.unwrap(),
        BoardEvent::QueueRemoved { id: a }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        BoardEvent::ActiveQueueChanged { id: None }
    );

    // Player events after removal go nowhere
    assert!(!player.advance_to(0));
}

#[tokio::test]
async fn removing_inactive_queue_keeps_playback() {
    let board = new_board();
    let a = board.add("A", tracks(&["a1"]), false, false).unwrap();
    let b = board.add("B", tracks(&["b1"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(Some("A".into()), player.clone()).unwrap();

    board.remove_queue(&b).unwrap();

    assert_eq!(board.current_queue_id(), Some(a));
    assert_eq!(ids(&player.items()), ["a1"]);
}

#[tokio::test]
async fn shuffle_toggle_resyncs_player() {
    let board = new_board();
    let a = board
        .add("A", tracks(&["a", "b", "c", "d", "e", "f"]), false, false)
        .unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(None, player.clone()).unwrap();
    assert!(player.advance_to(3));

    board.toggle_shuffle(&a, true).unwrap();

    let snapshot = board.get_queue(&a).unwrap();
    assert!(snapshot.shuffled);
    assert_eq!(snapshot.cursor, Some(0));
    assert_eq!(ids(&player.items()), ids(&snapshot.current_order));
    assert_eq!(player.current_track().unwrap().id().as_str(), "d");

    board.toggle_shuffle(&a, false).unwrap();

    assert_eq!(ids(&player.items()), ["a", "b", "c", "d", "e", "f"]);
    assert_eq!(player.current_index(), Some(3));
}

#[tokio::test]
async fn removing_playing_item_moves_player_to_next() {
    let board = new_board();
    let a = board.add("A", tracks(&["a", "b", "c"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(None, player.clone()).unwrap();
    assert!(player.advance_to(1));

    let removed = board.remove_at(&a, 1).unwrap();

    assert_eq!(removed.id().as_str(), "b");
    assert_eq!(ids(&player.items()), ["a", "c"]);
    assert_eq!(player.current_track().unwrap().id().as_str(), "c");
}

#[tokio::test]
async fn move_keeps_player_on_same_track() {
    let board = new_board();
    let a = board.add("A", tracks(&["a", "b", "c"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(None, player.clone()).unwrap();

    board.move_item(&a, 0, 2).unwrap();

    assert_eq!(ids(&player.items()), ["b", "c", "a"]);
    assert_eq!(player.current_track().unwrap().id().as_str(), "a");

    let err = board.move_item(&a, 0, 9).unwrap_err();
    assert!(matches!(err, QueueError::IndexOutOfRange { index: 9, len: 3 }));
}

#[tokio::test]
async fn clearing_bound_queue_then_refilling() {
    let board = new_board();
    let a = board.add("A", tracks(&["a", "b"]), false, false).unwrap();
    let player = Arc::new(MemoryPlayer::new());
    board.set_curr_queue(None, player.clone()).unwrap();

    board.clear_queue(&a).unwrap();
    assert!(player.is_stopped());
    assert_eq!(board.current_queue_id(), Some(a.clone()));

    board.add("A", tracks(&["c"]), false, true).unwrap();
    assert_eq!(ids(&player.items()), ["c"]);
    assert_eq!(player.current_index(), Some(0));
}

#[tokio::test]
async fn board_events_follow_mutations() {
    let board = new_board();
    let mut events = board.subscribe();

    let id = board.add("Q", tracks(&["a"]), false, false).unwrap();
    board.add("Q", tracks(&["b"]), false, true).unwrap();
    board.move_item(&id, 0, 1).unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        BoardEvent::QueueCreated {
            id: id.clone(),
            title: "Q".to_string()
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        BoardEvent::QueueUpdated {
            id: id.clone(),
            length: 2
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        BoardEvent::QueueUpdated { id, length: 2 }
    );
}

#[tokio::test]
async fn snapshots_are_detached() {
    let board = new_board();
    let id = board.add("Q", tracks(&["a", "b"]), false, false).unwrap();

    let before = board.get_queue(&id).unwrap();
    board.remove_at(&id, 0).unwrap();

    assert_eq!(before.len(), 2);
    assert_eq!(board.get_queue(&id).unwrap().len(), 1);
}
