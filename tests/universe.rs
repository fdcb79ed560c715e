//! invariants of the shared universe buffer, checked without any transport

use std::{
    sync::Barrier,
    thread,
    };

use opendmx::{Universe, Error};


#[test]
fn set_then_get_round_trips_on_every_channel() {
    let universe = Universe::new();
    for channel in 1 ..= 512u16 {
        let value = (channel % 256) as u8;
        universe.set(channel, value).unwrap();
        assert_eq!(universe.get(channel).unwrap(), value);
    }
}

#[test]
fn out_of_range_channels_are_rejected() {
    let universe = Universe::new();
    assert!(matches!(universe.set(0, 1), Err(Error::Channel(0))));
    assert!(matches!(universe.set(513, 1), Err(Error::Channel(513))));
    assert!(matches!(universe.get(0), Err(Error::Channel(0))));
    assert!(matches!(universe.get(600), Err(Error::Channel(600))));
    // a rejected access leaves the buffer untouched
    assert_eq!(universe.snapshot(), [0u8; 512]);
}

#[test]
fn reset_zeroes_every_channel() {
    let universe = Universe::new();
    universe.set(1, 255).unwrap();
    universe.set(100, 42).unwrap();
    universe.set(512, 7).unwrap();
    universe.reset();
    assert_eq!(universe.snapshot(), [0u8; 512]);
    assert_eq!(universe.get(100).unwrap(), 0);
}

#[test]
fn snapshot_maps_channels_from_one() {
    let universe = Universe::new();
    universe.set(1, 11).unwrap();
    universe.set(512, 22).unwrap();
    let snapshot = universe.snapshot();
    assert_eq!(snapshot.len(), 512);
    assert_eq!(snapshot[0], 11);
    assert_eq!(snapshot[511], 22);
}

#[test]
fn concurrent_writers_do_not_lose_updates() {
    const WRITERS: u16 = 8;
    const PER_WRITER: u16 = 64;

    let universe = Universe::new();
    let barrier = Barrier::new(usize::from(WRITERS));
    // every channel gets its own marker, a lost update would leave a zero or
    // a neighbour's value behind
    let marker = |channel: u16| (channel % 254 + 1) as u8;

    thread::scope(|scope| {
        for writer in 0 .. WRITERS {
            let universe = &universe;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for step in 0 .. PER_WRITER {
                    let channel = writer * PER_WRITER + step + 1;
                    universe.set(channel, marker(channel)).unwrap();
                }
            });
        }
    });

    for channel in 1 ..= WRITERS * PER_WRITER {
        assert_eq!(universe.get(channel).unwrap(), marker(channel), "channel {}", channel);
    }
}
