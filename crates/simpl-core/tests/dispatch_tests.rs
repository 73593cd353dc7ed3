//! Dispatch and creation integration tests
//!
//! Runs the dispatcher and the creation helpers over every element type.

use proptest::prelude::*;
use rstest::rstest;
use simpl_core::{
    create_array_from_type_tag, create_array_like, dispatch, dispatch_mut, execute_template,
    probe_scalar_type, ArrayVisitor, ArrayVisitorMut, AttributeArray, DataArray, Dispatcher,
    Element, FunctorFamily, MessageCollector, ScalarType, SimplResult, StringArray, TypedFunctor,
};

struct TypeOf;

impl ArrayVisitor for TypeOf {
    type Output = ScalarType;

    fn visit<T: Element>(self, _array: &DataArray<T>) -> SimplResult<ScalarType> {
        Ok(T::SCALAR_TYPE)
    }
}

struct Touch<'a>(&'a mut usize);

impl ArrayVisitorMut for Touch<'_> {
    type Output = ();

    fn visit<T: Element>(self, array: &mut DataArray<T>) -> SimplResult<()> {
        *self.0 += 1;
        array.initialize_with_value(T::from_f64(1.0));
        Ok(())
    }
}

struct Resolve;

#[derive(Default)]
struct ResolveFunctor<T>(std::marker::PhantomData<T>);

impl FunctorFamily for Resolve {
    type Args<'a> = ();
    type Output = ScalarType;
    type Functor<T: Element> = ResolveFunctor<T>;
}

impl<T: Element> TypedFunctor<Resolve> for ResolveFunctor<T> {
    fn predicate(&self, array: &dyn AttributeArray) -> bool {
        array.is_type::<T>()
    }

    fn execute<'a>(
        &self,
        _array: &mut dyn AttributeArray,
        _args: <Resolve as FunctorFamily>::Args<'a>,
    ) -> SimplResult<ScalarType> {
        Ok(T::SCALAR_TYPE)
    }
}

fn scalar_types() -> impl Strategy<Value = ScalarType> {
    prop::sample::select(ScalarType::ALL.to_vec())
}

// === Closure ===

#[rstest]
#[case(ScalarType::Int8)]
#[case(ScalarType::UInt8)]
#[case(ScalarType::Int16)]
#[case(ScalarType::UInt16)]
#[case(ScalarType::Int32)]
#[case(ScalarType::UInt32)]
#[case(ScalarType::Int64)]
#[case(ScalarType::UInt64)]
#[case(ScalarType::Float)]
#[case(ScalarType::Double)]
#[case(ScalarType::Bool)]
#[case(ScalarType::SizeT)]
fn test_every_type_dispatches_to_itself(#[case] scalar_type: ScalarType) {
    let mut array =
        create_array_from_type_tag(scalar_type.tag(), &[3], &[2], "a", true, 0.0).unwrap();

    assert_eq!(dispatch(array.as_ref(), TypeOf).unwrap(), scalar_type);
    assert_eq!(probe_scalar_type(array.as_ref()), Some(scalar_type));
    assert_eq!(
        execute_template::<Resolve>(array.as_mut(), ()).unwrap(),
        scalar_type
    );

    let mut calls = 0;
    dispatch_mut(array.as_mut(), Touch(&mut calls)).unwrap();
    assert_eq!(calls, 1);
}

// === No false match ===

#[test]
fn test_is_type_only_matches_own_type() {
    for created in ScalarType::ALL {
        let array = create_array_from_type_tag(created.tag(), &[1], &[1], "a", true, 0.0).unwrap();
        let matches: Vec<ScalarType> = ScalarType::ALL
            .into_iter()
            .filter(|&candidate| match candidate {
                ScalarType::Int8 => array.is_type::<i8>(),
                ScalarType::UInt8 => array.is_type::<u8>(),
                ScalarType::Int16 => array.is_type::<i16>(),
                ScalarType::UInt16 => array.is_type::<u16>(),
                ScalarType::Int32 => array.is_type::<i32>(),
                ScalarType::UInt32 => array.is_type::<u32>(),
                ScalarType::Int64 => array.is_type::<i64>(),
                ScalarType::UInt64 => array.is_type::<u64>(),
                ScalarType::Float => array.is_type::<f32>(),
                ScalarType::Double => array.is_type::<f64>(),
                ScalarType::Bool => array.is_type::<bool>(),
                ScalarType::SizeT => array.is_type::<usize>(),
            })
            .collect();
        assert_eq!(matches, vec![created]);
    }
}

// === Unsupported type ===

#[test]
fn test_unsupported_type_is_reported_exactly_once() {
    let collector = MessageCollector::new();
    let dispatcher = Dispatcher::new(&collector, "Unsupported Test");
    let mut strings = StringArray::from_values("Names", vec!["a".into(), "b".into()]);
    let mut calls = 0;

    let err = dispatcher
        .dispatch_mut(&mut strings, Touch(&mut calls))
        .unwrap_err();

    assert_eq!(err.code(), -401);
    assert_eq!(calls, 0);
    assert_eq!(collector.len(), 1);
    let message = &collector.errors()[0];
    assert_eq!(message.code, -401);
    assert_eq!(message.prefix, "Unsupported Test");
    assert_eq!(strings.values(), &["a".to_string(), "b".to_string()]);
}

#[test]
fn test_unsupported_type_through_functor_family() {
    let collector = MessageCollector::new();
    let dispatcher = Dispatcher::new(&collector, "Functor Test");
    let mut strings = StringArray::create(2, "Names", true);

    let err = dispatcher
        .execute_template::<Resolve>(&mut strings, ())
        .unwrap_err();

    assert_eq!(err.code(), -401);
    assert_eq!(collector.error_count(), 1);
    assert_eq!(probe_scalar_type(&strings), None);
}

// === Creation fidelity ===

#[rstest]
#[case(ScalarType::Float, &[4, 5], &[3])]
#[case(ScalarType::Bool, &[7], &[1])]
#[case(ScalarType::UInt64, &[2, 2, 2], &[2, 3])]
#[case(ScalarType::SizeT, &[1], &[6])]
#[case(ScalarType::Int8, &[3], &[1])]
#[case(ScalarType::UInt8, &[2, 3], &[4])]
#[case(ScalarType::Int16, &[5], &[2, 2])]
#[case(ScalarType::UInt16, &[1, 1], &[3])]
#[case(ScalarType::Int32, &[6], &[1])]
#[case(ScalarType::UInt32, &[2], &[5])]
#[case(ScalarType::Int64, &[3, 3], &[1, 2])]
#[case(ScalarType::Double, &[8], &[3])]
fn test_create_array_like_matches_type_and_shape(
    #[case] scalar_type: ScalarType,
    #[case] tuple_dims: &[usize],
    #[case] component_dims: &[usize],
) {
    let existing = create_array_from_type_tag(scalar_type.tag(), &[1], &[1], "src", true, 0.0)
        .unwrap();
    let created =
        create_array_like(existing.as_ref(), tuple_dims, component_dims, "dst", true).unwrap();

    assert_eq!(created.scalar_type(), Some(scalar_type));
    assert_eq!(created.type_as_string(), scalar_type.name());
    assert_eq!(
        created.number_of_tuples(),
        tuple_dims.iter().product::<usize>()
    );
    assert_eq!(created.component_dimensions(), component_dims);
    assert_eq!(created.name(), "dst");
}

// === Shape invariant ===

proptest! {
    #[test]
    fn test_buffer_length_matches_shape(
        scalar_type in scalar_types(),
        tuples in 0usize..64,
        dims in prop::collection::vec(1usize..5, 1..4),
        allocate in any::<bool>()
    ) {
        let array = create_array_from_type_tag(scalar_type.tag(), &[tuples], &dims, "p", allocate, 0.0)
            .unwrap();
        let components: usize = dims.iter().product();

        prop_assert_eq!(array.number_of_tuples(), tuples);
        prop_assert_eq!(array.number_of_components(), components);
        let expected = if allocate { tuples * components * scalar_type.element_size() } else { 0 };
        prop_assert_eq!(array.byte_len(), expected);
    }

    #[test]
    fn test_zero_component_dims_rejected(
        scalar_type in scalar_types(),
        dims in prop::collection::vec(1usize..5, 1..4),
        zero_at in 0usize..4
    ) {
        let mut dims = dims;
        let position = zero_at % dims.len();
        dims[position] = 0;
        prop_assert!(create_array_from_type_tag(scalar_type.tag(), &[3], &dims, "p", true, 0.0).is_err());
    }

    #[test]
    fn test_shape_holds_after_tuple_writes(
        tuples in 1usize..32,
        components in 1usize..5,
        index in 0usize..32,
        value in any::<i16>()
    ) {
        let mut array = DataArray::<i16>::create(tuples, &[components], "w", true).unwrap();
        let index = index % tuples;
        let expected = vec![value; components];
        array.set_tuple(index, &expected).unwrap();
        array.initialize_tuple(index, value).unwrap();

        prop_assert_eq!(array.number_of_tuples(), tuples);
        prop_assert_eq!(array.byte_len(), tuples * components * std::mem::size_of::<i16>());
        prop_assert_eq!(array.tuple(index).unwrap(), expected.as_slice());
    }
}
