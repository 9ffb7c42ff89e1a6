// -- < Testing shader programs > ---------------------------
#[cfg(test)]
pub mod shader_program_test {
    use std::rc::Rc;

    use crate::core::rendering::compilation_unit::CompilationUnit;
    use crate::core::rendering::shader::{
        ProgramState, ShaderError, ShaderStage, TransformFeedbackMode,
    };
    use crate::core::rendering::shader_backend::INVALID_LOCATION;
    use crate::core::rendering::shader_program::ShaderProgram;
    use crate::core::rendering::uniform::{UniformArray, UniformUpload, UniformValue};

    use super::super::shared_backend::fake_driver::*;

    type Unit = CompilationUnit<FakeDriver>;
    type Program = ShaderProgram<FakeDriver>;

    fn compiled(driver: &Rc<FakeDriver>, stage: ShaderStage, source: &str) -> Unit {
        let mut unit = CompilationUnit::new(driver.clone(), stage).unwrap();
        assert!(unit.compile(source), "{}", unit.log());
        unit
    }

    /// Program with the given sources attached, not linked yet
    fn program_with(
        driver: &Rc<FakeDriver>,
        vertex: &str,
        fragment: &str,
    ) -> (Program, Unit, Unit) {
        let vertex = compiled(driver, ShaderStage::Vertex, vertex);
        let fragment = compiled(driver, ShaderStage::Fragment, fragment);
        let mut program = ShaderProgram::new(driver.clone()).unwrap();
        program.attach(&vertex);
        program.attach(&fragment);
        (program, vertex, fragment)
    }

    fn linked_program(driver: &Rc<FakeDriver>) -> (Program, Unit, Unit) {
        let (mut program, vertex, fragment) = program_with(driver, VERTEX_SRC, FRAGMENT_SRC);
        assert!(program.link(), "{}", program.log());
        (program, vertex, fragment)
    }

    #[test]
    fn test_link_round_trip() {
        let driver = Rc::new(FakeDriver::new());
        let (program, _vertex, _fragment) = linked_program(&driver);

        assert!(program.log().is_empty());
        assert_eq!(program.state(), ProgramState::Linked);
        assert!(program.is_valid());

        assert!(!program.attributes().is_empty());
        assert!(!program.uniforms().is_empty());
        assert_eq!(program.attrib_location("position"), 0);
        assert!(program.attrib_location("color") > 0);
        for name in ["Transform", "Time", "Palette", "Mode"] {
            assert!(
                program.uniform_location(name) >= 0,
                "Uniform '{}' should be resolvable",
                name
            );
        }
        assert!(
            program.subroutines().is_empty(),
            "No stage declares subroutine uniforms"
        );
    }

    #[test]
    fn test_array_uniform_alias() {
        let driver = Rc::new(FakeDriver::new());
        let (program, _vertex, _fragment) = linked_program(&driver);

        let reported = program.uniform_location("Palette[0]");
        let alias = program.uniform_location("Palette");
        assert!(reported >= 0);
        assert_eq!(reported, alias);

        // Transform, Time, Palette[0], Palette and Mode
        assert_eq!(program.uniforms().len(), 5);
        assert!(!program.uniforms().contains_key("Time[0]"));
    }

    #[test]
    fn test_relink_is_idempotent() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) = linked_program(&driver);

        let attributes = program.attributes().clone();
        let uniforms = program.uniforms().clone();

        assert!(program.link());
        assert_eq!(program.attributes(), &attributes);
        assert_eq!(program.uniforms(), &uniforms);
    }

    #[test]
    fn test_failed_link_keeps_previous_maps() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, fragment) = linked_program(&driver);

        let attributes = program.attributes().clone();
        let uniforms = program.uniforms().clone();
        let time_location = program.uniform_location("Time");

        let mut broken = CompilationUnit::new(driver.clone(), ShaderStage::Fragment).unwrap();
        assert!(!broken.compile(BROKEN_SRC));
        program.detach(&fragment);
        program.attach(&broken);

        assert!(!program.link());
        assert!(!program.log().is_empty());
        assert_eq!(program.state(), ProgramState::LinkFailed);
        assert_eq!(program.attributes(), &attributes);
        assert_eq!(program.uniforms(), &uniforms);
        assert_eq!(program.uniform_location("Time"), time_location);
    }

    #[test]
    fn test_link_checked_reports_log() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) =
            program_with(&driver, VERTEX_SRC, MISMATCHED_FRAGMENT_SRC);

        match program.link_checked() {
            Err(ShaderError::Link(log)) => {
                assert!(log.contains("Time"));
                assert_eq!(log, program.log());
            }
            other => panic!("Expected a link error, got {:?}", other),
        }
        assert_eq!(program.state(), ProgramState::LinkFailed);
        assert!(program.uniforms().is_empty(), "Never linked successfully");
    }

    #[test]
    fn test_relink_drops_removed_names() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, fragment) = linked_program(&driver);
        assert!(program.uniform_location("Palette") >= 0);

        let plain = compiled(
            &driver,
            ShaderStage::Fragment,
            "#version 460 core\nout vec4 c;\nuniform float Time;\nvoid main() { c = vec4(Time); }\n",
        );
        program.detach(&fragment);
        program.attach(&plain);

        assert!(program.link());
        assert_eq!(program.uniform_location("Palette"), INVALID_LOCATION);
        assert_eq!(program.uniform_location("Palette[0]"), INVALID_LOCATION);
        assert!(program.uniform_location("Time") >= 0);
    }

    #[test]
    fn test_lookup_miss() {
        let driver = Rc::new(FakeDriver::new());
        let (program, _vertex, _fragment) = linked_program(&driver);

        assert_eq!(program.uniform_location("Missing"), INVALID_LOCATION);
        assert_eq!(program.attrib_location("normal"), INVALID_LOCATION);
        assert_eq!(program.set_uniform("Missing", 1.0f32), UniformUpload::Skipped);
        assert!(
            driver.uploads().is_empty(),
            "Unresolved names must not reach the driver"
        );
    }

    #[test]
    fn test_lookup_miss_reported_once_per_name() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) = linked_program(&driver);

        for _ in 0..10 {
            program.uniform_location("Missing");
            program.set_uniform("AlsoMissing", 2i32);
        }
        program.attrib_location("Missing");
        // Uniform and attribute misses are told apart
        assert_eq!(program.reported_miss_count(), 3);

        assert!(program.link());
        assert_eq!(
            program.reported_miss_count(),
            0,
            "A new link gets a fresh set of warnings"
        );
    }

    #[test]
    fn test_set_uniform_uploads_to_program() {
        let driver = Rc::new(FakeDriver::new());
        let (program, _vertex, _fragment) = linked_program(&driver);

        assert_eq!(program.set_uniform("Time", 1.5f32), UniformUpload::Uploaded);
        assert_eq!(
            program.set_uniform("Mode", glam::IVec2::new(1, 2)),
            UniformUpload::Uploaded
        );

        let uploads = driver.uploads();
        assert_eq!(
            uploads[0],
            RecordedUpload {
                program: program.handle(),
                location: program.uniform_location("Time"),
                upload: Upload::Value(UniformValue::Float(1.5)),
            }
        );
        assert_eq!(uploads[1].upload, Upload::Value(UniformValue::Int2(1, 2)));
        assert_eq!(
            driver.current_program(),
            0,
            "Program-targeted uploads do not bind the program"
        );
    }

    #[test]
    fn test_set_uniform_array_and_matrix() {
        let driver = Rc::new(FakeDriver::new());
        let (program, _vertex, _fragment) = linked_program(&driver);

        let palette = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        assert_eq!(
            program.set_uniform_array("Palette", UniformArray::Float3(&palette)),
            UniformUpload::Uploaded
        );
        let transform = glam::Mat4::IDENTITY;
        assert_eq!(
            program.set_uniform_matrix("Transform", &transform, true),
            UniformUpload::Uploaded
        );
        assert_eq!(
            program.set_uniform_matrix("NoSuchMatrix", &transform, false),
            UniformUpload::Skipped
        );

        let uploads = driver.uploads();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].location, program.uniform_location("Palette[0]"));
        assert_eq!(uploads[0].upload, Upload::Array { arity: 3, count: 2 });
        assert_eq!(
            uploads[1].upload,
            Upload::Matrix {
                dimensions: (4, 4),
                count: 1,
                transpose: true
            }
        );
    }

    #[test]
    fn test_use_program_requires_link() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) = program_with(&driver, VERTEX_SRC, FRAGMENT_SRC);

        assert_eq!(program.state(), ProgramState::Unlinked);
        assert!(!program.use_program());
        assert_eq!(driver.current_program(), 0);

        assert!(program.link());
        assert!(program.use_program());
        assert_eq!(driver.current_program(), program.handle());
    }

    #[test]
    fn test_subroutine_map() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        assert!(program.link(), "{}", program.log());

        let subroutines = program.subroutines();
        assert!(!subroutines.contains_key(&ShaderStage::Vertex));
        let fragment = &subroutines[&ShaderStage::Fragment];
        assert_eq!(fragment.len(), 2);

        let shade = &fragment["Shade"];
        assert_eq!(shade.index, 0);
        assert_eq!(shade.location, 0);
        assert_eq!(shade.subroutines.len(), 3);
        assert_eq!(shade.subroutines["identity"], 0);
        assert_eq!(shade.subroutines["inverted"], 1);
        assert_eq!(shade.subroutines["grayscale"], 2);
        assert_eq!(fragment["Tint"].location, 1);

        // Every slot starts at the first compatible subroutine
        assert_eq!(
            program.selected_subroutine(ShaderStage::Fragment, "Shade"),
            Some(0)
        );
        assert_eq!(
            program.selected_subroutine(ShaderStage::Fragment, "Tint"),
            Some(0)
        );
    }

    #[test]
    fn test_set_subroutine_submits_whole_stage() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        assert!(program.link());
        assert!(program.use_program());

        program
            .set_subroutine(ShaderStage::Fragment, "Tint", "grayscale")
            .unwrap();
        program
            .set_subroutine(ShaderStage::Fragment, "Shade", "inverted")
            .unwrap();

        let submissions = driver.subroutine_submissions();
        let last = submissions.last().unwrap();
        assert_eq!(last, &(program.handle(), ShaderStage::Fragment, vec![1, 2]));
        assert_eq!(
            program.selected_subroutine(ShaderStage::Fragment, "Tint"),
            Some(2)
        );
    }

    #[test]
    fn test_set_subroutine_unknown_names() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        assert!(program.link());
        let submitted = driver.subroutine_submissions().len();

        let result = program.set_subroutine(ShaderStage::Fragment, "Tint", "sepia");
        assert!(matches!(
            result,
            Err(ShaderError::SubroutineNotFound { ref subroutine, .. }) if subroutine == "sepia"
        ));
        assert!(program
            .set_subroutine(ShaderStage::Fragment, "Missing", "identity")
            .is_err());
        assert!(program
            .set_subroutine(ShaderStage::Vertex, "Tint", "identity")
            .is_err());

        assert_eq!(
            program.selected_subroutine(ShaderStage::Fragment, "Tint"),
            Some(0)
        );
        assert_eq!(driver.subroutine_submissions().len(), submitted);
    }

    #[test]
    fn test_use_program_resubmits_subroutines() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        assert!(program.link());
        assert!(program.use_program());
        program
            .set_subroutine(ShaderStage::Fragment, "Shade", "grayscale")
            .unwrap();

        // Something else gets bound in between
        let (other, _other_vertex, _other_fragment) = linked_program(&driver);
        assert!(other.use_program());

        let before = driver.subroutine_submissions().len();
        assert!(program.use_program());
        let submissions = driver.subroutine_submissions();
        assert_eq!(submissions.len(), before + 1);
        assert_eq!(
            submissions.last().unwrap(),
            &(program.handle(), ShaderStage::Fragment, vec![2, 0])
        );
    }

    #[test]
    fn test_set_subroutine_leaves_bound_program_alone() {
        let driver = Rc::new(FakeDriver::new());
        let (mut first, _first_vertex, _first_fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        let (mut second, _second_vertex, _second_fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        assert!(first.link());
        assert!(second.link());
        assert!(second.use_program());

        let before = driver.subroutine_submissions().len();
        first
            .set_subroutine(ShaderStage::Fragment, "Shade", "inverted")
            .unwrap();
        assert_eq!(
            driver.subroutine_submissions().len(),
            before,
            "Nothing is submitted while another program is bound"
        );
        assert_eq!(driver.current_program(), second.handle());
        assert_eq!(
            first.selected_subroutine(ShaderStage::Fragment, "Shade"),
            Some(1)
        );

        assert!(first.use_program());
        assert_eq!(
            driver.subroutine_submissions().last().unwrap(),
            &(first.handle(), ShaderStage::Fragment, vec![1, 0])
        );
    }

    #[test]
    fn test_relink_resets_subroutine_selection() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        assert!(program.link());
        program
            .set_subroutine(ShaderStage::Fragment, "Shade", "inverted")
            .unwrap();

        assert!(program.link());
        assert_eq!(
            program.selected_subroutine(ShaderStage::Fragment, "Shade"),
            Some(0)
        );
    }

    #[test]
    fn test_bind_attrib_location() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) = program_with(&driver, VERTEX_SRC, FRAGMENT_SRC);

        program.bind_attrib_location(5, "color");
        assert_eq!(
            program.attrib_location("color"),
            INVALID_LOCATION,
            "Bindings take effect on link"
        );

        assert!(program.link());
        assert_eq!(program.attrib_location("color"), 5);
        assert_eq!(program.attrib_location("position"), 0);
    }

    #[test]
    fn test_attribute_slot() {
        let driver = Rc::new(FakeDriver::new());
        let (program, _vertex, _fragment) = linked_program(&driver);

        assert_eq!(program.attribute_slot("position"), Some(0));
        let color = program.attrib_location("color");
        assert!(color > 0);
        assert_eq!(program.attribute_slot("color"), Some(color as u32));
        assert_eq!(program.attribute_slot("normal"), None);
    }

    #[test]
    fn test_transform_feedback_varyings() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) = program_with(&driver, VERTEX_SRC, FRAGMENT_SRC);

        program.set_transform_feedback_varyings(&["v_color"], TransformFeedbackMode::Separate);
        assert_eq!(
            driver.captured_varyings(program.handle()),
            None,
            "Varyings take effect on link"
        );

        assert!(program.link());
        assert_eq!(
            driver.captured_varyings(program.handle()),
            Some((vec!["v_color".to_owned()], TransformFeedbackMode::Separate))
        );
    }

    #[test]
    fn test_program_parameters() {
        const PROGRAM_BINARY_RETRIEVABLE_HINT: u32 = 0x8257;

        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) = linked_program(&driver);

        assert_eq!(program.parameter(PROGRAM_BINARY_RETRIEVABLE_HINT), 0);
        program.set_parameter(PROGRAM_BINARY_RETRIEVABLE_HINT, 1);
        assert_eq!(program.parameter(PROGRAM_BINARY_RETRIEVABLE_HINT), 1);
    }

    #[test]
    fn test_drop_deletes_program_once() {
        let driver = Rc::new(FakeDriver::new());
        let (program, vertex, fragment) = linked_program(&driver);
        let handle = program.handle();

        drop(program);
        assert_eq!(driver.deleted_programs(), vec![handle]);
        assert_eq!(driver.live_programs(), 0);

        // Units are owned separately and outlive the program
        assert!(vertex.is_compiled() && fragment.is_compiled());
        assert_eq!(driver.live_shaders(), 2);
    }

    #[test]
    fn test_debug_dump_does_not_change_state() {
        let driver = Rc::new(FakeDriver::new());
        let (mut program, _vertex, _fragment) =
            program_with(&driver, VERTEX_SRC, SUBROUTINE_FRAGMENT_SRC);
        program.set_debug_dump(true);

        assert!(program.link());
        program.dump();
        assert_eq!(program.state(), ProgramState::Linked);
        assert_eq!(program.subroutines()[&ShaderStage::Fragment].len(), 2);
    }
}
