use dobfs::concurrency::{epoch_stream, with_read_scope, RecvError, SendError, TryRecvError};
use dobfs::GhostToken;

#[test]
fn test_stream_markers_separate_transactions() {
    GhostToken::new(|token| {
        let (tx, rx) = epoch_stream(4);

        tx.send(1, &token).unwrap();
        tx.close(&token).unwrap();
        tx.close(&token).unwrap();

        assert_eq!(rx.recv(&token), Ok(Some(1)));
        assert_eq!(rx.recv(&token), Ok(None));
        // An empty transaction is just a marker.
        assert_eq!(rx.recv(&token), Ok(None));
        assert_eq!(rx.try_recv(&token), Err(TryRecvError::Empty));
    });
}

#[test]
fn test_stream_disconnect() {
    GhostToken::new(|token| {
        let (tx, rx) = epoch_stream::<i32>(1);
        drop(tx);
        assert_eq!(rx.recv(&token), Err(RecvError));

        let (tx, rx) = epoch_stream::<i32>(1);
        drop(rx);
        assert_eq!(tx.send(5, &token), Err(SendError(5)));
    });
}

#[test]
fn test_stream_epochs_across_threads() {
    // Producer emits three epochs of sizes 3, 0 and 5 through a one-slot stream.
    GhostToken::new(|token| {
        let (tx, rx) = epoch_stream::<u32>(1);
        let batches = with_read_scope(&token, |scope| {
            let producer = scope
                .spawn_named("producer", move |t| {
                    for size in [3u32, 0, 5] {
                        for i in 0..size {
                            tx.send(i, t).unwrap();
                        }
                        tx.close(t).unwrap();
                    }
                })
                .unwrap();

            let mut batches = Vec::new();
            let mut current = Vec::new();
            loop {
                match rx.recv(scope.token()) {
                    Ok(Some(v)) => current.push(v),
                    Ok(None) => batches.push(std::mem::take(&mut current)),
                    Err(RecvError) => break,
                }
            }
            producer.join().unwrap();
            batches
        });
        assert_eq!(batches, vec![vec![0, 1, 2], vec![], vec![0, 1, 2, 3, 4]]);
    });
}
