use std::collections::HashMap;

use ndarray::{ArrayView1, ArrayView2, Axis};

use slicestat_nostd_internal::{AccumStateView, OutputDescr, Reducer, StatePackViewMut};

/// compute the output quantities from every accum_state in a statepack and
/// return the result in a HashMap.
///
/// Keys are the output component names listed by [`Reducer::output_descr`]
/// and each value holds 1 entry per slice.
pub fn get_output(
    reducer: &impl Reducer,
    statepack: &StatePackViewMut,
) -> HashMap<&'static str, Vec<f64>> {
    get_output_from_statepack_array(reducer, &statepack.as_array_view())
}

/// the same as [`get_output`], but for a raw `[accum_state_size, n_slices]`
/// array
pub fn get_output_from_statepack_array(
    reducer: &impl Reducer,
    statepack_data: &ArrayView2<f64>,
) -> HashMap<&'static str, Vec<f64>> {
    let description = reducer.output_descr();
    let n_slices = statepack_data.shape()[1];
    let n_comps = description.n_per_accum_state();

    let mut buffer_view = ndarray::Array2::<f64>::zeros([n_comps, n_slices]);
    for i in 0..n_slices {
        reducer.value_from_accum_state(
            &mut buffer_view.index_axis_mut(Axis(1), i),
            &AccumStateView::from_array_view(statepack_data.index_axis(Axis(1), i)),
        );
    }

    match description {
        OutputDescr::MultiScalarComp(names) => {
            let _to_vec = |row: ArrayView1<f64>| row.iter().cloned().collect();
            let row_iter = buffer_view.rows().into_iter().map(_to_vec);
            HashMap::from_iter(names.iter().cloned().zip(row_iter))
        }
    }
}
