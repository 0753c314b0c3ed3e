use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use std::sync::Arc;

use chantier_core::{ItemCode, RequestId, Warehouse};
use chantier_ledger::InMemoryLedger;
use chantier_requests::{MaterialRequest, RequestLine};
use chantier_reservations::ReservationManager;
use chantier_workflow::{
    InMemoryDiscrepancyLog, InMemoryRequests, InMemoryReturns, InMemoryTransferLog,
    MaterialFlowService, StockSettings,
};

fn central() -> Warehouse {
    Warehouse::new("Central - Warehouse")
}

fn fresh_request(lines: usize) -> (MaterialFlowService, RequestId) {
    let ledger = Arc::new(InMemoryLedger::new());
    let request_lines: Vec<RequestLine> = (0..lines)
        .map(|i| {
            let code = ItemCode::new(format!("ITEM-{i}"));
            ledger.set_stock(&central(), &code, 1_000);
            RequestLine::new(code, "Unit", 10)
        })
        .collect();
    let service = MaterialFlowService::new(
        ledger,
        Arc::new(InMemoryRequests::new()),
        Arc::new(InMemoryReturns::new()),
        Arc::new(InMemoryDiscrepancyLog::new()),
        Arc::new(InMemoryTransferLog::new()),
        StockSettings::new(central()),
    );
    let id = service
        .create_request(MaterialRequest::new(
            RequestId::new(),
            "Site1",
            None,
            request_lines,
        ))
        .expect("create");
    (service, id)
}

fn bench_submit_then_ship(c: &mut Criterion) {
    let mut group = c.benchmark_group("workflow");
    for lines in [1usize, 10, 50] {
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_function(format!("submit_then_ship/{lines}_lines"), |b| {
            b.iter_batched(
                || fresh_request(lines),
                |(service, id)| {
                    service.submit_request(black_box(id)).expect("submit");
                    service.ship_request(black_box(id)).expect("ship");
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_reservation_round_trip(c: &mut Criterion) {
    let ledger = Arc::new(InMemoryLedger::without_reservation_records());
    let code = ItemCode::new("ITEM-0");
    ledger.set_stock(&central(), &code, 1_000_000);
    let manager = ReservationManager::new(ledger);
    let request_id = RequestId::new();

    c.bench_function("reservation/counter_round_trip", |b| {
        b.iter(|| {
            manager.reserve(black_box(request_id), &code, 10, &central());
            manager
                .release(black_box(request_id), &code, 10, &central())
                .expect("release");
        })
    });
}

criterion_group!(benches, bench_submit_then_ship, bench_reservation_round_trip);
criterion_main!(benches);
