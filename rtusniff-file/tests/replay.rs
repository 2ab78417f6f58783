use rtusniff_file::{Batch, Session};
use rtusniff_modbus::{Kind, Modbus};

#[test]
fn test_replay_split_transaction() {
    // A read transaction that arrived over three reads of the port, inserted
    // out of order, with unrelated traffic afterwards.
    let mut session = Session::new();
    session
        .insert(Batch::parse("6B 00 03 76 87 11 03 06", 10.02).unwrap())
        .unwrap();
    session
        .insert(Batch::parse("11 03 00", 10.0).unwrap())
        .unwrap();
    session
        .insert(Batch::parse("AE 41 56 52 43 40 49 AD", 10.05).unwrap())
        .unwrap();
    session
        .insert(Batch::parse("01 03 00 01 00 02 95 CB", 42.0).unwrap())
        .unwrap();

    let mut buffer = Vec::new();
    session.save(&mut buffer).unwrap();
    let session = Session::load(std::io::Cursor::new(buffer)).unwrap();

    let tokens = rtusniff_file::session::tokens(session.between(None, Some(11.0)));
    let frames = Modbus::default().decode(&tokens);
    assert_eq!(
        frames
            .iter()
            .map(|frame| (frame.kind(), frame.timestamp()))
            .collect::<Vec<_>>(),
        vec![
            (Kind::ReadRequest, Some(10.0)),
            (Kind::ReadResponse, Some(10.02))
        ]
    );

    let frames = Modbus::default().decode(&session.tokens());
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2].kind(), Kind::ReadRequest);
    assert_eq!(frames[2].slave_id(), Some(1));
}
