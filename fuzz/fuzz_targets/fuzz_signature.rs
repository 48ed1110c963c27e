#![no_main]

use std::sync::mpsc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

use binjava_signature::{ClassifierResolver, MalformedSignature, SignatureParser};
use libfuzzer_sys::fuzz_target;

mod utils;

const TIMEOUT: Duration = Duration::from_secs(1);

struct Runner {
    input_tx: mpsc::SyncSender<Vec<u8>>,
    output_rx: Mutex<mpsc::Receiver<()>>,
}

fn check_error<T>(text: &str, result: Result<T, MalformedSignature>) {
    if let Err(err) = result {
        assert_eq!(err.text, text);
        assert!(
            err.position <= text.len() && text.is_char_boundary(err.position),
            "error position {} is not a char boundary of {text:?}",
            err.position
        );
    }
}

fn run_one(input: &[u8]) {
    let Some(text) = utils::truncate_utf8(input) else {
        return;
    };

    let resolver = ClassifierResolver::detached();
    let parser = SignatureParser::new(&resolver);

    check_error(text, parser.parse_type_signature(text, &resolver));
    check_error(text, parser.parse_field_descriptor(text, &resolver));
    check_error(text, parser.parse_method_descriptor(text, &resolver));
    check_error(text, parser.parse_method_signature(text, &mut resolver.fork()));
    check_error(text, parser.parse_class_signature(text, &mut resolver.fork()));

    let _ = ClassifierResolver::map_internal_name_to_qualified_name(text);
}

fn runner() -> &'static Runner {
    static RUNNER: OnceLock<Runner> = OnceLock::new();
    RUNNER.get_or_init(|| {
        let (input_tx, input_rx) = mpsc::sync_channel::<Vec<u8>>(0);
        let (output_tx, output_rx) = mpsc::sync_channel::<()>(0);

        std::thread::spawn(move || {
            for input in input_rx {
                run_one(&input);
                let _ = output_tx.send(());
            }
        });

        Runner {
            input_tx,
            output_rx: Mutex::new(output_rx),
        }
    })
}

fuzz_target!(|data: &[u8]| {
    let cap = data.len().min(utils::MAX_INPUT_SIZE);

    let runner = runner();
    runner
        .input_tx
        .send(data[..cap].to_vec())
        .expect("fuzz_signature worker thread exited");

    match runner
        .output_rx
        .lock()
        .expect("fuzz_signature worker receiver poisoned")
        .recv_timeout(TIMEOUT)
    {
        Ok(()) => {}
        Err(mpsc::RecvTimeoutError::Timeout) => panic!("fuzz_signature fuzz target timed out"),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            panic!("fuzz_signature worker thread panicked")
        }
    }
});
