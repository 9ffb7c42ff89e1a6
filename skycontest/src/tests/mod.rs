mod test_shader_program;
