use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rtusniff::token::{self, Token};
use rtusniff_modbus::scanner::scan;
use rtusniff_modbus::{checksum, Kind, ReadRequest};

/// A polling loop: every station is asked for ten registers and answers,
/// with a couple of noise bytes between transactions.
fn polling_traffic(transactions: u8) -> Vec<Token> {
    let mut bytes = Vec::new();
    for slave_id in 1..=transactions {
        bytes.extend(ReadRequest::encode(slave_id, 3, 0x0100, 10));
        let mut response = vec![slave_id, 3, 20];
        response.extend((0..20).map(|i| i as u8));
        checksum::append(&mut response);
        bytes.extend(response);
        bytes.extend_from_slice(&[0x00, 0xff]);
    }
    token::from_bytes(&bytes, 0.0)
}

fn criterion_benchmark(c: &mut Criterion) {
    let tokens = polling_traffic(200);

    // Assert output is what we expect before benchmarking
    let frames = scan(&tokens);
    assert_eq!(frames.len(), 600);
    assert_eq!(frames[0].kind(), Kind::ReadRequest);
    assert_eq!(frames[1].kind(), Kind::ReadResponse);
    assert_eq!(frames[2].kind(), Kind::Unrecognized);

    c.bench_function("scan", |b| b.iter(|| scan(black_box(&tokens))));

    let noise = token::from_bytes(&[0xaa; 4096], 0.0);
    c.bench_function("scan_noise", |b| b.iter(|| scan(black_box(&noise))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
