use docstash::collection::Collection;
use docstash::errors::{ErrorKind, StoreResult};
use docstash::marshal::JsonMarshaler;
use docstash::memory::MemoryCollection;
use docstash_fjall_adapter::FjallCollection;
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};
use std::{env, fs, thread};

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Student {
    pub name: String,
    pub age: u32,
}

impl Student {
    pub fn new(name: &str, age: u32) -> Self {
        Student {
            name: name.to_string(),
            age,
        }
    }
}

/// The three students every suite starts from.
pub fn sample_students() -> Vec<Student> {
    vec![
        Student::new("annie", 32),
        Student::new("ben", 50),
        Student::new("clive", 21),
    ]
}

pub fn insert_sample_students(collection: &mut dyn Collection<Student>) -> StoreResult<()> {
    for student in sample_students() {
        let key = student.name.clone();
        collection.put(&key, student)?;
    }
    Ok(())
}

/// Which storage sits behind a test collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Fjall,
    MemoryOverFjall,
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    backend: Backend,
}

impl TestContext {
    pub fn new(path: String, backend: Backend) -> Self {
        Self { path, backend }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Creates a new, closed collection over this context's storage.
    pub fn collection(&self) -> Box<dyn Collection<Student>> {
        match self.backend {
            Backend::Memory => Box::new(MemoryCollection::new()),
            Backend::Fjall => Box::new(self.fjall_collection()),
            Backend::MemoryOverFjall => {
                Box::new(MemoryCollection::layered(self.fjall_collection()))
            }
        }
    }

    /// Whether documents survive closing and reopening a collection.
    pub fn is_durable(&self) -> bool {
        self.backend != Backend::Memory
    }

    fn fjall_collection(&self) -> FjallCollection<Student> {
        FjallCollection::with_config()
            .low_memory_preset()
            .db_path(&self.path)
            .partition_name("students")
            .build(JsonMarshaler::<Student>::new())
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir.join(id.to_string()).to_str().unwrap().to_string()
}

pub fn create_memory_context() -> StoreResult<TestContext> {
    Ok(TestContext::new(random_path(), Backend::Memory))
}

pub fn create_fjall_context() -> StoreResult<TestContext> {
    Ok(TestContext::new(random_path(), Backend::Fjall))
}

pub fn create_layered_context() -> StoreResult<TestContext> {
    Ok(TestContext::new(random_path(), Backend::MemoryOverFjall))
}

pub fn cleanup(ctx: TestContext) -> StoreResult<()> {
    let mut retry = 0;
    while fs::metadata(ctx.path()).is_ok() {
        match fs::remove_dir_all(ctx.path()) {
            Ok(_) => break,
            Err(err) if retry >= 2 => return Err(err.into()),
            Err(_) => {
                retry += 1;
                thread::sleep(Duration::from_millis(100));
            }
        }
    }
    Ok(())
}

/// Runs a test between `before` and `after`, retrying a failed attempt.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> StoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> StoreResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> StoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| -> Result<(), (String, String)> {
            let backtrace = Backtrace::capture();
            let ctx = before()
                .map_err(|e| (format!("Before run failed: {:?}", e), backtrace.to_string()))?;

            let test_result = test(ctx.clone());
            let after_result = after(ctx);
            match (test_result, after_result) {
                (Ok(_), Ok(_)) => Ok(()),
                (Err(e), _) => Err((format!("Test failed: {:?}", e), backtrace.to_string())),
                (Ok(_), Err(e)) => {
                    Err((format!("After run failed: {:?}", e), backtrace.to_string()))
                }
            }
        });

        let elapsed = start_time.elapsed();

        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    log::debug!("Backtrace of failed attempt:\n{}", bt);
                }
                e
            }
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                format!("Panic: {}", err_msg)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// Exercises the whole collection contract against one backend:
/// open → put → has → get → delete → count → first → last → close.
pub fn conformance_suite(ctx: &TestContext) -> StoreResult<()> {
    let mut collection = ctx.collection();

    // closed until opened
    let err = collection.get("annie").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Closed);

    collection.open()?;
    insert_sample_students(collection.as_mut())?;

    // put / has / get
    assert!(collection.has("ben")?);
    assert_eq!(collection.get("ben")?, Student::new("ben", 50));
    assert_eq!(
        collection.put("", Student::new("nobody", 0)).unwrap_err().kind(),
        &ErrorKind::InvalidKey
    );
    assert!(!collection.has("")?);

    // delete
    collection.put("dora", Student::new("dora", 9))?;
    collection.delete("dora")?;
    assert!(!collection.has("dora")?);
    assert_eq!(collection.get("dora").unwrap_err().kind(), &ErrorKind::NotFound);
    collection.delete("dora")?;

    // count / first / last
    let it = collection.iter().sort_keys(|a, b| a < b)?;
    assert_eq!(it.count(), 3);
    assert!(it.first());
    assert_eq!(it.key(), Some("annie".to_string()));
    assert!(it.last());
    assert_eq!(it.key(), Some("clive".to_string()));
    it.release();

    collection.close()?;
    assert_eq!(collection.has("ben").unwrap_err().kind(), &ErrorKind::Closed);
    Ok(())
}
