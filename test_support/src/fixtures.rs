//! Kotlin sources shared across tests.

/// Class with one aliased step, one concatenated step, and a helper.
pub const STEP_CLASS: &str = r#"package steps

import com.thoughtworks.gauge.Step

class StepImpl {
    @Step("Say <hello> to <world>", "Greet <hello>, <world>")
    fun helloWorld(greeting: String, name: Int): String {
        return "$greeting $name"
    }

    @Step("This is " + "a step")
    fun concatenated() {
    }

    fun helper() = Unit
}
"#;

/// Step whose only argument is not a string literal.
pub const CONSTANT_ARGUMENT: &str = r#"const val TEXT = "hidden"

@Step(TEXT)
fun fromConstant() {
}
"#;

/// One function carrying two independent step annotations.
pub const TWO_INVOCATIONS: &str = r#"object Steps {
    @Step("first")
    @Step("second", "third")
    fun twice() {
    }
}
"#;

/// The single step the `foo.kt` data file declares.
pub const NEW_STEP: &str = "new step";

/// Replacement contents for `foo.kt`, declaring one different step.
pub const RELOADED: &str = r#"class Foo {
    @Step("reloaded step")
    fun reloaded() {
    }
}
"#;
