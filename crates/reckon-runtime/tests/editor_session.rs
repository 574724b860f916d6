//! Matrix-editor session lifecycle: binding, cell navigation, row
//! deletion, submatrix extraction, and commit semantics.

use reckon_values::alloc::fault;
use reckon_runtime::{
    CalcError, EditorState, OperandStack, RealCell, RealMatrix, RpnStack, Session, Value,
    VariableStore, Workspace,
};

fn session() -> Session<RpnStack, Workspace> {
    Session::new(RpnStack::new(), Workspace::new())
}

fn four_rows() -> Value {
    Value::RealMatrix(RealMatrix::from_data(4, 1, vec![10.0, 20.0, 30.0, 40.0]).unwrap())
}

#[test]
fn edit_snapshots_the_stack_matrix_and_commits_back() {
    let mut s = session();
    s.stack.replace_x(Value::RealMatrix(
        RealMatrix::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
    ));

    s.edit().unwrap();
    assert_eq!(s.stack.x(), &Value::Real(1.0));
    assert!(matches!(s.editor().state(), EditorState::EditingCopy(_)));

    s.stack.replace_x(Value::Real(9.0));
    s.exit_editor().unwrap();

    assert!(!s.editor().is_active());
    match s.stack.x() {
        Value::RealMatrix(m) => assert_eq!(
            m.cells(),
            &[
                RealCell::Num(9.0),
                RealCell::Num(2.0),
                RealCell::Num(3.0),
                RealCell::Num(4.0)
            ]
        ),
        other => panic!("expected matrix back on the stack, got {other:?}"),
    }
}

#[test]
fn edit_named_commits_into_the_variable() {
    let mut s = session();
    s.vars.store("M", four_rows()).unwrap();

    s.edit_named("M").unwrap();
    assert_eq!(s.stack.x(), &Value::Real(10.0));

    s.advance_row().unwrap();
    s.stack.replace_x(Value::Real(-20.0));
    s.exit_editor().unwrap();

    assert_eq!(
        s.vars.recall("M").unwrap().element(1, 0).unwrap(),
        Value::Real(-20.0)
    );
}

#[test]
fn index_rejects_non_matrices_and_active_edits() {
    let mut s = session();
    assert_eq!(s.index("M").unwrap_err(), CalcError::Nonexistent);

    s.vars.store("X", Value::Real(1.0)).unwrap();
    assert_eq!(s.index("X").unwrap_err(), CalcError::InvalidType);

    s.vars.store("M", four_rows()).unwrap();
    s.edit_named("M").unwrap();
    assert_eq!(s.index("M").unwrap_err(), CalcError::RestrictedOperation);
}

#[test]
fn advance_wraps_row_major_and_flags_the_edges() {
    let mut s = session();
    s.vars
        .store(
            "M",
            Value::RealMatrix(RealMatrix::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap()),
        )
        .unwrap();
    s.index("M").unwrap();

    s.advance_row().unwrap();
    assert_eq!(s.editor().cursor(), (1, 0));
    assert!(!s.config.flags.matrix_edge_wrap);
    assert!(!s.config.flags.matrix_end_wrap);

    s.advance_row().unwrap();
    assert_eq!(s.editor().cursor(), (0, 1));
    assert!(s.config.flags.matrix_edge_wrap);
    assert!(!s.config.flags.matrix_end_wrap);

    s.advance_row().unwrap();
    assert_eq!(s.editor().cursor(), (1, 1));
    assert!(!s.config.flags.matrix_edge_wrap);

    s.advance_row().unwrap();
    assert_eq!(s.editor().cursor(), (0, 0));
    assert!(s.config.flags.matrix_edge_wrap);
    assert!(s.config.flags.matrix_end_wrap);

    s.retreat_row().unwrap();
    assert_eq!(s.editor().cursor(), (1, 1));
    assert!(s.config.flags.matrix_edge_wrap);
    assert!(s.config.flags.matrix_end_wrap);
}

#[test]
fn deleting_the_bottom_row_moves_the_cursor_up() {
    let mut s = session();
    s.vars.store("M", four_rows()).unwrap();
    s.edit_named("M").unwrap();
    s.goto_cell(3, 0).unwrap();
    assert_eq!(s.stack.x(), &Value::Real(40.0));

    s.delete_row().unwrap();

    // The cursor moved up one row and X shows the cell from two rows above
    // the deleted one.
    assert_eq!(s.editor().cursor(), (2, 0));
    assert_eq!(s.stack.x(), &Value::Real(30.0));
    match s.vars.recall("M").unwrap() {
        Value::RealMatrix(m) => {
            assert_eq!(m.rows(), 3);
            assert_eq!(
                m.cells(),
                &[RealCell::Num(10.0), RealCell::Num(20.0), RealCell::Num(30.0)]
            );
        }
        _ => unreachable!(),
    }
}

#[test]
fn deleting_a_middle_row_keeps_the_cursor_and_shows_the_next_cell() {
    let mut s = session();
    s.vars.store("M", four_rows()).unwrap();
    s.edit_named("M").unwrap();
    s.goto_cell(1, 0).unwrap();

    s.delete_row().unwrap();

    assert_eq!(s.editor().cursor(), (1, 0));
    assert_eq!(s.stack.x(), &Value::Real(30.0));
}

#[test]
fn delete_row_requires_a_session_and_two_rows() {
    let mut s = session();
    assert_eq!(s.delete_row().unwrap_err(), CalcError::Nonexistent);

    s.vars
        .store(
            "M",
            Value::RealMatrix(RealMatrix::from_data(1, 2, vec![1.0, 2.0]).unwrap()),
        )
        .unwrap();
    s.index("M").unwrap();
    assert_eq!(s.delete_row().unwrap_err(), CalcError::DimensionError);
}

#[test]
fn get_submatrix_reads_the_block_at_the_cursor() {
    let mut s = session();
    s.vars
        .store(
            "M",
            Value::RealMatrix(
                RealMatrix::from_data(3, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
                    .unwrap(),
            ),
        )
        .unwrap();
    s.index("M").unwrap();
    s.goto_cell(1, 1).unwrap();

    // Y rows, X columns.
    s.stack.xy_result(Value::Real(2.0), Value::Real(2.0));
    s.get_submatrix().unwrap();

    match s.stack.x() {
        Value::RealMatrix(m) => {
            assert_eq!((m.rows(), m.cols()), (2, 2));
            assert_eq!(
                m.cells(),
                &[
                    RealCell::Num(5.0),
                    RealCell::Num(6.0),
                    RealCell::Num(8.0),
                    RealCell::Num(9.0)
                ]
            );
        }
        _ => unreachable!(),
    }
}

#[test]
fn get_submatrix_is_bounds_checked() {
    let mut s = session();
    s.vars.store("M", four_rows()).unwrap();
    s.index("M").unwrap();
    s.goto_cell(2, 0).unwrap();

    s.stack.xy_result(Value::Real(1.0), Value::Real(3.0)); // 3 rows from row 2
    assert_eq!(s.get_submatrix().unwrap_err(), CalcError::DimensionError);
}

#[test]
fn commit_failure_keeps_the_session_active_except_for_allocation() {
    let mut s = session();
    s.vars.store("M", four_rows()).unwrap();
    s.edit_named("M").unwrap();

    // A kind mismatch blocks the exit and the session stays open.
    s.stack.replace_x(Value::Complex(1.0, 1.0));
    assert_eq!(s.exit_editor().unwrap_err(), CalcError::InvalidType);
    assert!(s.editor().is_active());

    // An allocation failure on the final store is tolerated: the edit is
    // lost but the user gets out.
    s.stack.replace_x(Value::Real(99.0));
    fault::fail_after(0);
    s.exit_editor().unwrap();
    fault::reset();
    assert!(!s.editor().is_active());
    assert_eq!(
        s.vars.recall("M").unwrap().element(0, 0).unwrap(),
        Value::Real(10.0)
    );
}

#[test]
fn text_cells_travel_through_the_editor() {
    let mut s = session();
    let m = RealMatrix::from_cells(
        2,
        1,
        vec![RealCell::text("AB"), RealCell::Num(2.0)],
    )
    .unwrap();
    s.stack.replace_x(Value::RealMatrix(m));

    s.edit().unwrap();
    assert_eq!(s.stack.x(), &Value::Text("AB".to_string()));

    s.advance_row().unwrap();
    s.stack.replace_x(Value::text("CD"));
    s.exit_editor().unwrap();

    match s.stack.x() {
        Value::RealMatrix(m) => {
            assert_eq!(m.cells(), &[RealCell::text("AB"), RealCell::text("CD")])
        }
        _ => unreachable!(),
    }
}
