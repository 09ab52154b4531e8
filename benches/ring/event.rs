//! Benchmarks for event framing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use wam_rt::event::{Event, MidiEvent, ParamChange};
use wam_rt::ring::EventRingBuffer;
use wam_rt::{CurveType, ParamIndex};

pub fn bench_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring/event");

    // Events per quantum, from sparse automation to dense MIDI
    for &count in &[1usize, 16, 64] {
        let events: Vec<Event> = (0..count as u32)
            .map(|i| {
                if i % 2 == 0 {
                    Event::param_change(
                        i,
                        ParamChange::new(ParamIndex::new(i % 8), 0.5, 64, CurveType::Linear),
                    )
                } else {
                    Event::midi(
                        i,
                        MidiEvent::NoteOn {
                            channel: 0,
                            key: 60,
                            velocity: 100,
                        },
                    )
                }
            })
            .collect();

        let (mut tx, mut rx) = EventRingBuffer::new(16 * 1024).unwrap();
        let mut drained = Vec::with_capacity(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("write_drain", count), &count, |b, _| {
            b.iter(|| {
                for event in &events {
                    let _ = tx.write(black_box(event));
                }
                drained.clear();
                rx.read_due_bounded(black_box(u32::MAX), &mut drained)
            })
        });

        let sysex = Event::sysex(0, &[0x42; 200]).unwrap();
        group.bench_with_input(BenchmarkId::new("sysex", count), &count, |b, _| {
            b.iter(|| {
                for _ in 0..count {
                    let _ = tx.write(black_box(&sysex));
                    black_box(rx.pop());
                }
            })
        });
    }

    group.finish();
}
