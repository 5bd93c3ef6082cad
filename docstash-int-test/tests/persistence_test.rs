use docstash::collection::Collection;
use docstash::errors::ErrorKind;
use docstash::memory::MemoryCollection;
use docstash_int_test::test_util::{
    cleanup, create_fjall_context, create_layered_context, create_memory_context,
    insert_sample_students, run_test, Student,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_memory_collection_forgets_on_close() {
    run_test(
        create_memory_context,
        |ctx| {
            assert!(!ctx.is_durable());
            let mut collection = ctx.collection();
            collection.open()?;
            insert_sample_students(collection.as_mut())?;
            collection.close()?;

            collection.open()?;
            assert!(!collection.has("annie")?);
            assert_eq!(collection.iter().count(), 0);
            collection.close()
        },
        cleanup,
    )
}

#[test]
fn test_fjall_collection_survives_reopen() {
    run_test(
        create_fjall_context,
        |ctx| {
            assert!(ctx.is_durable());
            let mut collection = ctx.collection();
            collection.open()?;
            insert_sample_students(collection.as_mut())?;
            collection.close()?;

            let mut reopened = ctx.collection();
            reopened.open()?;
            assert_eq!(reopened.get("ben")?, Student::new("ben", 50));
            assert_eq!(reopened.iter().count(), 3);
            reopened.close()
        },
        cleanup,
    )
}

#[test]
fn test_layered_collection_reloads_on_open() {
    run_test(
        create_layered_context,
        |ctx| {
            let mut collection = ctx.collection();
            collection.open()?;
            insert_sample_students(collection.as_mut())?;
            collection.delete("clive")?;
            collection.close()?;

            // a fresh cache over the same files sees the written state
            let mut reloaded = ctx.collection();
            reloaded.open()?;
            assert!(reloaded.has("annie")?);
            assert!(!reloaded.has("clive")?);
            assert_eq!(
                reloaded.get("clive").unwrap_err().kind(),
                &ErrorKind::NotFound
            );
            reloaded.close()
        },
        cleanup,
    )
}

#[test]
fn test_memory_over_memory_writes_through() {
    run_test(
        create_memory_context,
        |_ctx| {
            let mut collection = MemoryCollection::layered(MemoryCollection::<Student>::new());
            collection.open()?;
            collection.put("ben", Student::new("ben", 50))?;
            assert_eq!(collection.get("ben")?.age, 50);
            collection.delete("ben")?;
            assert!(!collection.has("ben")?);
            collection.close()
        },
        cleanup,
    )
}
