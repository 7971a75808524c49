#![no_main]
use libfuzzer_sys::fuzz_target;

use byteorder::{BigEndian, ReadBytesExt};
use sketch_summary::summary::check::check_equal;
use sketch_summary::summary::Summary;
use sketch_summary::util::Xorshift;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);

    // bounded 2**16
    let len: u32 = if let Ok(res) = cursor.read_u32::<BigEndian>() {
        res % 65_536
    } else {
        return;
    };
    // unbounded
    let seed: u64 = if let Ok(res) = cursor.read_u64::<BigEndian>() {
        res
    } else {
        return;
    };
    let splits: [u32; 2] = match (cursor.read_u32::<BigEndian>(), cursor.read_u32::<BigEndian>()) {
        (Ok(a), Ok(b)) if len > 0 => {
            let (a, b) = (a % (len + 1), b % (len + 1));
            if a <= b {
                [a, b]
            } else {
                [b, a]
            }
        }
        _ => return,
    };

    let mut xshft = Xorshift::new(seed);
    let values: Vec<f64> = (0..len).map(|_| xshft.next_range(1.0, 2.0)).collect();
    let (lo, hi) = (splits[0] as usize, splits[1] as usize);

    let a: Summary = values[..lo].iter().cloned().collect();
    let b: Summary = values[lo..hi].iter().cloned().collect();
    let c: Summary = values[hi..].iter().cloned().collect();

    let mut left = a;
    left += b;
    left += c;
    let mut bc = b;
    bc += c;
    let mut right = a;
    right += bc;

    assert_eq!(values.len() as u64, left.count);
    check_equal(&left, &right).unwrap();
});
