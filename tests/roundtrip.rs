//! Encoder output read back through the decoder.

use bflat::{Decoder, Encoder, Error, Type, Utf16, ValueView};
use rand::prelude::*;

fn decode_all(data: &[u8]) -> Vec<ValueView> {
    let mut decoder = Decoder::new();
    decoder.parse(data);
    decoder.map(|v| v.unwrap()).collect()
}

#[test]
fn integer_extremes() {
    let mut buf = vec![0u8; 1024];
    let mut enc = Encoder::new(&mut buf);
    for v in [0, -1, 1, i8::MAX, i8::MIN] {
        enc.int8("value", v).unwrap();
    }
    for v in [128, -129, i16::MIN, i16::MAX] {
        enc.int16("v", v).unwrap();
    }
    for v in [i32::MIN, i32::MAX] {
        enc.int32("va", v).unwrap();
    }
    for v in [i64::MIN, i64::MAX] {
        enc.int64("value", v).unwrap();
        enc.datetime("when", v).unwrap();
        enc.varint("leb", v).unwrap();
    }
    let len = enc.len();
    let longs: Vec<i64> = decode_all(&buf[..len])
        .iter()
        .map(|v| v.long().unwrap())
        .collect();
    assert_eq!(
        longs,
        [
            0,
            -1,
            1,
            127,
            -128,
            128,
            -129,
            -32768,
            32767,
            i32::MIN as i64,
            i32::MAX as i64,
            i64::MIN,
            i64::MIN,
            i64::MIN,
            i64::MAX,
            i64::MAX,
            i64::MAX
        ]
    );
}

#[test]
fn double_extremes() {
    let values = [0.0, -1.0, 1.0, 127.01, -128.01, f64::MIN_POSITIVE, f64::MAX, f64::MIN, 5e-324];
    let mut buf = vec![0u8; 1024];
    let mut enc = Encoder::new(&mut buf);
    for v in values {
        enc.double("value", v).unwrap();
    }
    let len = enc.len();
    let views = decode_all(&buf[..len]);
    for (view, v) in views.iter().zip(values) {
        assert_eq!(view.double().unwrap().to_bits(), v.to_bits());
    }
    assert_eq!(views.len(), values.len());
}

#[test]
fn double_array() {
    let values = [0.0, -1.0, 1.0, 127.01, -128.01, f64::MIN_POSITIVE, f64::MAX];
    let mut buf = [0u8; 128];
    let mut enc = Encoder::new(&mut buf);
    enc.array(Type::Double, "value", values.len()).unwrap();
    for v in values {
        enc.append_double(v).unwrap();
    }
    let len = enc.len();
    let views = decode_all(&buf[..len]);
    assert_eq!(views.len(), 1);
    let view = &views[0];
    assert_eq!(view.tag().unwrap(), "value");
    assert!(view.is_array());
    assert_eq!(view.count(), 7);
    for (i, v) in values.iter().enumerate() {
        assert_eq!(view.double_at(i).unwrap(), *v);
    }
}

#[test]
fn growing_ascii_tags_and_strings() {
    const MAX: usize = 600;
    let tag = "t".repeat(MAX + 1);
    let data = "d".repeat(MAX);
    let mut buf = vec![0u8; 2 * MAX * (MAX + 8)];
    let mut enc = Encoder::new(&mut buf);
    for len in 0..MAX {
        enc.string(&tag[..len + 1], &data[..len]).unwrap();
    }
    let len = enc.len();
    let views = decode_all(&buf[..len]);
    assert_eq!(views.len(), MAX);
    for (index, view) in views.iter().enumerate() {
        assert_eq!(view.tag().unwrap(), &tag[..index + 1]);
        assert_eq!(view.string().unwrap(), &data[..index]);
    }
}

#[test]
fn growing_unicode_tags_and_strings() {
    const MAX: usize = 300;
    let tag: Vec<u16> = "ᄑ".repeat(MAX + 1).encode_utf16().collect();
    let data: Vec<u16> = "睷".repeat(MAX).encode_utf16().collect();
    let mut buf = vec![0u8; 4 * MAX * (MAX + 8)];
    let mut enc = Encoder::new(&mut buf);
    for len in 0..MAX {
        enc.string(&Utf16(&tag[..len + 1]), &Utf16(&data[..len])).unwrap();
    }
    let len = enc.len();
    let views = decode_all(&buf[..len]);
    assert_eq!(views.len(), MAX);
    for (index, view) in views.iter().enumerate() {
        assert_eq!(view.tag().unwrap(), "ᄑ".repeat(index + 1));
        assert_eq!(view.string().unwrap(), "睷".repeat(index));
    }
}

#[test]
fn thousands_of_code_points() {
    let text: String = (0..5000u32)
        .filter_map(|i| char::from_u32(0x100 + i * 37 % 0x10000))
        .filter(|c| !c.is_ascii())
        .collect();
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut buf = vec![0u8; 16 * units.len() + 64];
    let mut enc = Encoder::new(&mut buf);
    enc.string(&Utf16(&units), &Utf16(&units)).unwrap();
    enc.string(text.as_str(), text.as_str()).unwrap();
    let len = enc.len();
    let (first, second) = buf[..len].split_at(len / 2);
    assert_eq!(first, second, "UTF-16 and str sources must encode identically");
    for view in decode_all(&buf[..len]) {
        assert_eq!(view.tag().unwrap(), text);
        assert_eq!(view.string().unwrap(), text);
    }
}

#[test]
fn tag_lengths() {
    let mut buf = [0u8; 64];
    let mut enc = Encoder::new(&mut buf);
    assert_eq!(enc.int8("", 1).unwrap_err(), Error::EmptyTag);
    enc.int8("sevenxx", 7).unwrap();
    enc.int8("eightxxx", 8).unwrap();
    let len = enc.len();
    assert_eq!(buf[0], 0x1F);
    assert_eq!(&buf[9..11], &[0x18, 8]);
    let views = decode_all(&buf[..len]);
    assert_eq!(views[0].raw_tag(), (1, 7));
    assert_eq!(views[1].tag().unwrap(), "eightxxx");
    assert_eq!(views[1].int8().unwrap(), 8);
}

#[test]
fn random_arrays() {
    let mut rng = StdRng::seed_from_u64(0xB1A7);
    let mut buf = vec![0u8; 1 << 16];
    for _ in 0..50 {
        let ints: Vec<i64> = (0..rng.gen_range(0..40))
            .map(|_| rng.gen::<i64>() >> rng.gen_range(0..64))
            .collect();
        let blobs: Vec<Vec<u8>> = (0..rng.gen_range(0..10))
            .map(|_| (0..rng.gen_range(0..300)).map(|_| rng.gen()).collect())
            .collect();

        let mut enc = Encoder::new(&mut buf);
        enc.array(Type::Varint, "ints", ints.len()).unwrap();
        for &v in &ints {
            enc.append_varint(v).unwrap();
        }
        enc.array(Type::Int64, "wide", ints.len()).unwrap();
        for &v in &ints {
            enc.append_int64(v).unwrap();
        }
        enc.array(Type::Binary, "blobs", blobs.len()).unwrap();
        for blob in &blobs {
            enc.append_binary(blob).unwrap();
        }
        let len = enc.len();

        let views = decode_all(&buf[..len]);
        assert_eq!(views.len(), 3);
        for view in &views[..2] {
            let decoded: Vec<i64> = (0..view.count()).map(|i| view.long_at(i).unwrap()).collect();
            assert_eq!(decoded, ints);
        }
        let decoded: Vec<&[u8]> = (0..views[2].count())
            .map(|i| views[2].bytes_at(i).unwrap())
            .collect();
        assert_eq!(decoded, blobs);
    }
}

#[test]
fn buffer_too_small_reports_position() {
    let mut buf = [0u8; 10];
    let mut enc = Encoder::new(&mut buf);
    enc.int32("abc", 1).unwrap();
    let err = enc.int32("abc", 2).unwrap_err();
    assert_eq!(err, Error::BufferTooSmall { step: "text", position: 9 });
}
